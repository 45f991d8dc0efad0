mod support;

mod consumer_tests;
mod masking_tests;
mod provider_tests;
