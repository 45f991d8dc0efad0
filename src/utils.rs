use tracing_subscriber::EnvFilter;

const RECIPIENT_MASK: &str = "****";

/// Masks a recipient for logging: first two and last two characters survive,
/// everything between becomes the mask token. Values of four characters or
/// fewer are replaced entirely so nothing of the original leaks.
pub fn mask_recipient(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();

    if chars.len() <= 4 {
        return RECIPIENT_MASK.to_string();
    }

    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();

    format!("{}{}{}", head, RECIPIENT_MASK, tail)
}

/// Masks an optional recipient field, logging absent fields as "-".
pub fn mask_optional(value: Option<&str>) -> String {
    match value {
        Some(v) => mask_recipient(v),
        None => "-".to_string(),
    }
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
