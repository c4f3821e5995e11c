/// One query waiting on the answer service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exchange {
    pub session_id: String,
    pub query: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    Sending,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The server returned full history and it replaced the local messages.
    Replaced,
    /// An answer, or the placeholder, was appended.
    Answered,
    /// The request failed and a warning was appended.
    Failed,
}
