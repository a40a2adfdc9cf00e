// CI-V transaction engine
// One frame out, echo discarded, one reply back, classified OK or NG

use super::error::{ErrorKind, RadioError, RadioResult};
use super::frame::build_frame;
use super::reply::{Reply, ReplyStatus};
use super::types::{Address, CommandCode};
use super::{hex_string, MIN_REPLY_LEN, TERMINATOR};
use crate::drivers::model::DeviceModel;
use crate::serial::Transport;
use std::sync::Arc;

/// Where the engine is within the current (or last) transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Idle,
    FrameSent,
    AwaitingEchoOrReply,
    AwaitingReply,
    Completed(ReplyStatus),
    Failed(ErrorKind),
}

/// Drives request/reply exchanges for one transceiver over an owned transport.
///
/// Exchanges are strictly sequential. Callers sharing a transceiver between
/// tasks must serialize access (for example behind a `tokio::sync::Mutex`).
pub struct CivEngine<T: Transport> {
    transport: T,
    model: Arc<DeviceModel>,
    transceiver: Address,
    controller: Address,
    state: TransactionState,
}

impl<T: Transport> CivEngine<T> {
    /// Create an engine addressing `transceiver`, using the model's controller address
    pub fn new(transport: T, model: Arc<DeviceModel>, transceiver: Address) -> Self {
        let controller = model.controller_address;
        Self {
            transport,
            model,
            transceiver,
            controller,
            state: TransactionState::Idle,
        }
    }

    /// Override the controller address taken from the model
    pub fn with_controller(mut self, controller: Address) -> Self {
        self.controller = controller;
        self
    }

    pub fn model(&self) -> &DeviceModel {
        &self.model
    }

    pub fn transceiver_address(&self) -> Address {
        self.transceiver
    }

    pub fn controller_address(&self) -> Address {
        self.controller
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn baud_rate(&self) -> u32 {
        self.transport.baud_rate()
    }

    /// Close the transport; the engine is unusable afterwards
    pub fn close(&mut self) -> RadioResult<()> {
        self.transport.close()?;
        self.state = TransactionState::Idle;
        Ok(())
    }

    /// Run one exchange for a raw 1-2 byte command
    pub async fn execute(&mut self, command: &[u8], payload: &[u8]) -> RadioResult<Reply> {
        self.execute_with_preamble(command, payload, &[]).await
    }

    /// Run one exchange, sending `preamble` ahead of the frame
    pub async fn execute_with_preamble(
        &mut self,
        command: &[u8],
        payload: &[u8],
        preamble: &[u8],
    ) -> RadioResult<Reply> {
        self.state = TransactionState::Idle;
        match CommandCode::try_from(command) {
            Ok(code) => self.transact(code, payload, preamble).await,
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Run one exchange for an already validated command code.
    ///
    /// NG replies are returned as data; the caller decides whether they are failures.
    pub async fn transact(
        &mut self,
        command: CommandCode,
        payload: &[u8],
        preamble: &[u8],
    ) -> RadioResult<Reply> {
        self.transition(TransactionState::Idle);

        if payload.contains(&TERMINATOR) {
            return Err(self.fail(RadioError::InvalidCommand(format!(
                "payload for {} contains the 0xFD terminator",
                command
            ))));
        }
        if let Err(e) = self.model.validate(&command, payload) {
            return Err(self.fail(e));
        }

        let frame = build_frame(preamble, self.transceiver, self.controller, &command, payload);
        tracing::debug!("TX {}", hex_string(&frame));

        if let Err(e) = self.transport.write_all(&frame).await {
            return Err(self.fail(e.into()));
        }
        self.transition(TransactionState::FrameSent);

        self.transition(TransactionState::AwaitingEchoOrReply);
        let mut reply = match self.transport.read_until(TERMINATOR).await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.fail(e.into())),
        };

        if reply == frame {
            tracing::debug!("Echo {}", hex_string(&reply));
            self.transition(TransactionState::AwaitingReply);
            reply = match self.transport.read_until(TERMINATOR).await {
                Ok(bytes) => bytes,
                Err(e) => return Err(self.fail(e.into())),
            };
        }
        tracing::debug!("RX {}", hex_string(&reply));

        if reply.len() < MIN_REPLY_LEN {
            return Err(self.fail(RadioError::NoReply { len: reply.len() }));
        }

        let reply = Reply::classify(reply);
        self.transition(TransactionState::Completed(reply.status()));
        Ok(reply)
    }

    fn transition(&mut self, next: TransactionState) {
        tracing::debug!("{:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn fail(&mut self, err: RadioError) -> RadioError {
        tracing::warn!("CI-V transaction with {} failed: {}", self.transceiver, err);
        self.transition(TransactionState::Failed(err.kind()));
        err
    }
}
