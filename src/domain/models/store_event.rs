/// Published by the session store after a change has been persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    Created(String),
    Selected(Option<String>),
    Deleted(String),
    MessagesChanged(String),
    Renamed(String),
    Cleared,
}
