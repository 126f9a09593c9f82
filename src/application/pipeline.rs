use crate::domain::message::{SwitchReply, SwitchRequest};
use crate::domain::ports::{RequestHandler, RequestHandlerRef};
use crate::error::{Result, SwitchError};
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::{debug, info};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Which way a request is travelling relative to the switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Peer to switch.
    Incoming,
    /// Switch to peer.
    Outgoing,
}

/// A business rule: one stage of a peer's pipeline.
///
/// Both handlers default to passing the request straight on.
#[async_trait]
pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;

    async fn startup(&self) -> Result<()> {
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn incoming(&self, request: SwitchRequest, next: Next<'_>) -> Result<SwitchReply> {
        next.run(request).await
    }

    async fn outgoing(&self, request: SwitchRequest, next: Next<'_>) -> Result<SwitchReply> {
        next.run(request).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RuleState {
    Created = 0,
    Started = 1,
    Active = 2,
    Stopped = 3,
}

impl RuleState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => RuleState::Created,
            1 => RuleState::Started,
            2 => RuleState::Active,
            _ => RuleState::Stopped,
        }
    }
}

impl fmt::Display for RuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleState::Created => f.write_str("not started"),
            RuleState::Started => f.write_str("started"),
            RuleState::Active => f.write_str("active"),
            RuleState::Stopped => f.write_str("stopped"),
        }
    }
}

/// A rule instance together with its lifecycle state.
///
/// Requests are only admitted between `startup` and `shutdown`.
pub struct ManagedRule {
    rule: Box<dyn Rule>,
    state: AtomicU8,
}

impl ManagedRule {
    pub fn new(rule: impl Rule + 'static) -> Self {
        Self {
            rule: Box::new(rule),
            state: AtomicU8::new(RuleState::Created as u8),
        }
    }

    pub fn name(&self) -> &'static str {
        self.rule.name()
    }

    pub fn state(&self) -> RuleState {
        RuleState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn invalid_state(&self, state: RuleState) -> SwitchError {
        SwitchError::InvalidState {
            rule: self.name().to_string(),
            state: state.to_string(),
        }
    }

    pub async fn startup(&self) -> Result<()> {
        let state = self.state();
        if state != RuleState::Created {
            return Err(self.invalid_state(state));
        }
        self.rule.startup().await?;
        self.state.store(RuleState::Started as u8, Ordering::Release);
        info!(rule = self.name(), "rule started");
        Ok(())
    }

    /// Stops admitting requests, then lets the rule clean up.
    pub async fn shutdown(&self) -> Result<()> {
        let previous =
            RuleState::from_u8(self.state.swap(RuleState::Stopped as u8, Ordering::AcqRel));
        match previous {
            RuleState::Stopped => Err(self.invalid_state(previous)),
            RuleState::Created => Ok(()),
            RuleState::Started | RuleState::Active => {
                self.rule.shutdown().await?;
                info!(rule = self.name(), "rule stopped");
                Ok(())
            }
        }
    }

    fn admit(&self) -> Result<()> {
        match self.state() {
            RuleState::Active => Ok(()),
            RuleState::Started => {
                // Losing this race to shutdown leaves the state Stopped.
                match self.state.compare_exchange(
                    RuleState::Started as u8,
                    RuleState::Active as u8,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    Ok(_) => Ok(()),
                    Err(current) if current == RuleState::Active as u8 => Ok(()),
                    Err(current) => Err(self.invalid_state(RuleState::from_u8(current))),
                }
            }
            state => Err(self.invalid_state(state)),
        }
    }
}

/// The remainder of a pipeline, handed to each rule so it can continue the
/// chain.
pub struct Next<'a> {
    direction: Direction,
    rules: &'a [Arc<ManagedRule>],
    terminal: &'a dyn RequestHandler,
}

impl<'a> Next<'a> {
    pub fn run(self, request: SwitchRequest) -> BoxFuture<'a, Result<SwitchReply>> {
        let Some((rule, rest)) = self.rules.split_first() else {
            return self.terminal.handle(request);
        };
        if let Err(e) = rule.admit() {
            return Box::pin(async move { Err(e) });
        }

        let next = Next {
            direction: self.direction,
            rules: rest,
            terminal: self.terminal,
        };
        debug!(rule = rule.name(), direction = ?self.direction, "rule handling request");
        match self.direction {
            Direction::Incoming => rule.rule.incoming(request, next),
            Direction::Outgoing => rule.rule.outgoing(request, next),
        }
    }
}

/// Rules threaded in order in front of a terminal handler.
pub struct Pipeline {
    direction: Direction,
    rules: Vec<Arc<ManagedRule>>,
    terminal: RequestHandlerRef,
}

#[async_trait]
impl RequestHandler for Pipeline {
    async fn handle(&self, request: SwitchRequest) -> Result<SwitchReply> {
        Next {
            direction: self.direction,
            rules: &self.rules,
            terminal: self.terminal.as_ref(),
        }
        .run(request)
        .await
    }
}

/// Composes `rules` in front of `terminal`. With no rules the terminal is
/// returned as is.
pub fn compose(
    direction: Direction,
    rules: &[Arc<ManagedRule>],
    terminal: RequestHandlerRef,
) -> RequestHandlerRef {
    if rules.is_empty() {
        return terminal;
    }
    Arc::new(Pipeline {
        direction,
        rules: rules.to_vec(),
        terminal,
    })
}
