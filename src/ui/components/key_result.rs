/// Outcome of offering a key to a component.
///
/// Lets popups report back to the app without each one defining its own
/// result enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Key was consumed, nothing else to do
  Handled,
  /// Key was consumed and produced an event for the app
  Event(T),
  /// Key was not consumed
  NotHandled,
}
