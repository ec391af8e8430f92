// Document persistence and editing.
//
// store:    Postgres CRUD, owner-scoped
// drafts:   Redis autosave snapshots
// edits:    field-level edit commands, applied atomically
// handlers: HTTP surface for documents, drafts, previews, exports and assets

pub mod drafts;
pub mod edits;
pub mod handlers;
pub mod store;
