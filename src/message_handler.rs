/*
 * Intercept-then-delegate message handling. A subclassed window gets a
 * `MessageHandler` that either answers a message itself or lets it fall
 * through to whatever procedure was installed before it. `Chain` composes a
 * handler with that forwarding target so the window procedure only has to
 * build the message and call `dispatch`.
 */

/// A raw window message, decoupled from the Win32 parameter newtypes so the
/// dispatch logic can be exercised on any platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowMessage {
    pub msg: u32,
    pub wparam: usize,
    pub lparam: isize,
}

impl WindowMessage {
    pub const fn new(msg: u32, wparam: usize, lparam: isize) -> Self {
        Self {
            msg,
            wparam,
            lparam,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The handler consumed the message; the value is the procedure result.
    Handled(isize),
    Forward,
}

pub trait MessageHandler {
    fn handle(&mut self, message: &WindowMessage) -> Disposition;
}

impl<F> MessageHandler for F
where
    F: FnMut(&WindowMessage) -> Disposition,
{
    fn handle(&mut self, message: &WindowMessage) -> Disposition {
        self(message)
    }
}

/// The procedure a subclass delegates to for messages it does not handle.
pub trait Forwarder {
    fn forward(&mut self, message: &WindowMessage) -> isize;
}

pub struct Chain<H, F> {
    handler: H,
    next: F,
}

impl<H, F> Chain<H, F>
where
    H: MessageHandler,
    F: Forwarder,
{
    pub fn new(handler: H, next: F) -> Self {
        Self { handler, next }
    }

    pub fn dispatch(&mut self, message: &WindowMessage) -> isize {
        match self.handler.handle(message) {
            Disposition::Handled(result) => result,
            Disposition::Forward => self.next.forward(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingForwarder {
        forwarded: Vec<u32>,
    }

    impl Forwarder for &mut RecordingForwarder {
        fn forward(&mut self, message: &WindowMessage) -> isize {
            self.forwarded.push(message.msg);
            -7
        }
    }

    #[test]
    fn handled_messages_do_not_reach_previous_procedure() {
        let mut previous = RecordingForwarder::default();
        let handler = |m: &WindowMessage| {
            if m.msg == 0x004E {
                Disposition::Handled(1)
            } else {
                Disposition::Forward
            }
        };
        let mut chain = Chain::new(handler, &mut previous);

        assert_eq!(chain.dispatch(&WindowMessage::new(0x004E, 0, 0)), 1);
        assert_eq!(chain.dispatch(&WindowMessage::new(0x000F, 0, 0)), -7);
        drop(chain);

        assert_eq!(previous.forwarded, vec![0x000F]);
    }

    #[test]
    fn stateful_handler_sees_every_message_in_order() {
        let mut previous = RecordingForwarder::default();
        let mut seen = Vec::new();
        {
            let handler = |m: &WindowMessage| {
                seen.push(m.wparam);
                Disposition::Forward
            };
            let mut chain = Chain::new(handler, &mut previous);
            for i in 0..3 {
                chain.dispatch(&WindowMessage::new(0x0100, i, 0));
            }
        }
        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(previous.forwarded.len(), 3);
    }
}
