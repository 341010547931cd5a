/// Severity of a transient user-facing notice.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AdvisoryLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl AdvisoryLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            AdvisoryLevel::Info => "info",
            AdvisoryLevel::Success => "success",
            AdvisoryLevel::Warning => "warning",
            AdvisoryLevel::Error => "error",
        }
    }
}

/// A transient message shown to the user (toast). Never carries state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub level: AdvisoryLevel,
    pub message: String,
}

impl Advisory {
    pub fn new(level: AdvisoryLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(AdvisoryLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(AdvisoryLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(AdvisoryLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(AdvisoryLevel::Error, message)
    }
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level.as_str(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::{Advisory, AdvisoryLevel};

    #[test]
    fn display_includes_level() {
        let a = Advisory::error("Need at least 2 points to create a shape");
        assert_eq!(a.level, AdvisoryLevel::Error);
        assert_eq!(
            a.to_string(),
            "[error] Need at least 2 points to create a shape"
        );
    }
}
