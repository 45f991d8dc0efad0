use crate::models::{channel::Channel, error::DispatchError, message::NotificationJob};

/// Structural validation of a job. Failures here are fatal: the job will
/// never become valid on redelivery.
pub fn validate_job(job: &NotificationJob) -> Result<(), DispatchError> {
    let channels = job.requested_channels();

    if channels.is_empty() {
        return Err(DispatchError::Validation(
            "job requests no channels".to_string(),
        ));
    }

    for channel in channels {
        match channel {
            Channel::Email => validate_email_address(job.email.as_deref())?,
            Channel::Sms | Channel::Whatsapp => {
                validate_phone_number(job.phone.as_deref(), channel)?
            }
        }
    }

    Ok(())
}

fn validate_email_address(email: Option<&str>) -> Result<(), DispatchError> {
    let email = email.unwrap_or("").trim();

    if email.is_empty() {
        return Err(DispatchError::Validation(
            "email channel requested but no email address provided".to_string(),
        ));
    }

    if !email.contains('@') {
        return Err(DispatchError::Validation(format!(
            "email address missing '@' (length {})",
            email.len()
        )));
    }

    Ok(())
}

fn validate_phone_number(phone: Option<&str>, channel: Channel) -> Result<(), DispatchError> {
    let phone = phone.unwrap_or("").trim();

    if phone.is_empty() {
        return Err(DispatchError::Validation(format!(
            "{} channel requested but no phone number provided",
            channel
        )));
    }

    let digits = phone.strip_prefix('+').unwrap_or(phone);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(DispatchError::Validation(format!(
            "phone number for {} channel contains non-digit characters",
            channel
        )));
    }

    Ok(())
}
