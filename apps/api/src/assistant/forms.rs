/// Single-input lookup form (drug name for the notice and the toxicity lookup).
///
/// `set_query` is the only way to change the input; `submission` decides whether
/// there is anything to send. Rendering and layout never touch this state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupForm {
    query: String,
}

impl LookupForm {
    pub fn with_query(query: impl Into<String>) -> Self {
        let mut form = Self::default();
        form.set_query(query);
        form
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// The trimmed query, or `None` when it is blank.
    pub fn submission(&self) -> Option<String> {
        let trimmed = self.query.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}
