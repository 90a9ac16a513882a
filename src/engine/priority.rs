/// Lead priority for notification rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Normal,
}

const STAR: &str = "⭐️";

impl Priority {
    /// Score a revenue bracket: high if it contains any keyword.
    pub fn from_revenue(revenue_bracket: &str, keywords: &[String]) -> Self {
        if keywords
            .iter()
            .any(|k| !k.is_empty() && revenue_bracket.contains(k.as_str()))
        {
            Priority::High
        } else {
            Priority::Normal
        }
    }

    pub fn units(self) -> usize {
        match self {
            Priority::High => 3,
            Priority::Normal => 1,
        }
    }

    pub fn indicator(self) -> String {
        STAR.repeat(self.units())
    }
}
