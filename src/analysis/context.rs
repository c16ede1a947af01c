use crate::timestamp::Timestamp;

/// Immutable per-run analysis settings, shared read-only by every worker.
///
/// Each worker builds its own filter and analyzers from this; nothing here is
/// mutated once a run starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisContext {
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub keyword: Option<String>,
    pub pattern: Option<String>,
}

impl AnalysisContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_from(mut self, from: Option<Timestamp>) -> Self {
        self.from = from;
        self
    }

    pub fn with_to(mut self, to: Option<Timestamp>) -> Self {
        self.to = to;
        self
    }

    pub fn with_keyword(mut self, keyword: Option<String>) -> Self {
        self.keyword = keyword;
        self
    }

    pub fn with_pattern(mut self, pattern: Option<String>) -> Self {
        self.pattern = pattern;
        self
    }

    /// Human-readable summary of the active filters, e.g.
    /// `from=2026-01-05 10:00:00, keyword="db"`. Empty when nothing is set.
    pub fn describe_filters(&self) -> String {
        let mut parts = Vec::new();
        if let Some(from) = &self.from {
            parts.push(format!("from={}", from));
        }
        if let Some(to) = &self.to {
            parts.push(format!("to={}", to));
        }
        if let Some(keyword) = &self.keyword {
            parts.push(format!("keyword=\"{}\"", keyword));
        }
        if let Some(pattern) = &self.pattern {
            parts.push(format!("pattern=\"{}\"", pattern));
        }
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_filters() {
        assert_eq!(AnalysisContext::new().describe_filters(), "");

        let ctx = AnalysisContext::new()
            .with_from(Timestamp::parse("2026-01-05 10:00:00"))
            .with_to(Timestamp::parse("2026-01-05 11:00:00"))
            .with_keyword(Some("db".to_string()));
        assert_eq!(
            ctx.describe_filters(),
            "from=2026-01-05 10:00:00, to=2026-01-05 11:00:00, keyword=\"db\""
        );
    }
}
