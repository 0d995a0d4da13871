#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WatchCommandAction {
    NotHandled,
    Continue,
    Quit,
}
