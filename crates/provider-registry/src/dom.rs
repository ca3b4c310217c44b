use std::collections::HashSet;

/// Static snapshot of the page the registry matches against.
///
/// Element ids and text are lowercased on construction so rule evaluation is
/// a plain lookup. The snapshot is built from script results supplied by the
/// browser adapter; the registry never touches the live page.
#[derive(Clone, Debug, Default)]
pub struct DomSnapshot {
    element_ids: HashSet<String>,
    page_text: String,
}

impl DomSnapshot {
    pub fn new<I, S>(element_ids: I, page_text: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            element_ids: element_ids
                .into_iter()
                .map(|id| id.into().to_ascii_lowercase())
                .collect(),
            page_text: page_text.into().to_ascii_lowercase(),
        }
    }

    pub fn has_element(&self, id: &str) -> bool {
        self.element_ids.contains(&id.to_ascii_lowercase())
    }

    pub fn text_contains(&self, needle: &str) -> bool {
        self.page_text.contains(&needle.to_ascii_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.element_ids.is_empty() && self.page_text.is_empty()
    }
}
