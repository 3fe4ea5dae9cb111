//! Read-only state threaded through every pass of one run.

use crate::compat::CompatibilityProfile;
use crate::options::{Config, Level2Options};
use crate::registry::Registry;
use crate::validator::Validator;

#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub registry: &'a Registry,
    pub validator: Validator<'a>,
    pub options: &'a Level2Options,
}

impl<'a> Context<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            registry: Registry::global(),
            validator: Validator::new(&config.compatibility),
            options: &config.level2,
        }
    }

    pub fn compat(&self) -> &'a CompatibilityProfile {
        self.validator.compat
    }
}
