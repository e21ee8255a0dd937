//! Chat assistant and toxicity lookup. Both are thin wrappers over the backend;
//! the state they keep is the explicit view-models in `chat` and `forms`.

pub mod chat;
pub mod forms;
pub mod handlers;
pub mod sessions;
