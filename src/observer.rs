use crate::SignalError;

/// Receives the signals of an observable: any number of `next` calls followed by
/// at most one of `error` or `complete`.
pub trait Observer {
    type NextFnType;

    fn next(&mut self, _: Self::NextFnType);
    fn complete(&mut self);
    fn error(&mut self, _: SignalError);
}
