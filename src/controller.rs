//! Decision-side controller.

use crate::{
    agents::DecisionAgent,
    error::{Error, Result},
    perception::WorldView,
    protocol::{AckMessage, ActionReply, Message, Messenger, StateMessage},
    types::Direction,
};

/// Per-agent server endpoint in the decision process.
///
/// Holds the messenger's server side, the agent's world view, and the
/// decision policy. The learn/evaluate transition is applied from each
/// incoming message's `test_mode` flag before the policy is consulted, so a
/// run can interleave learning and evaluation steps freely.
pub struct AgentController {
    messenger: Box<dyn Messenger + Send>,
    agent: Box<dyn DecisionAgent>,
    view: WorldView,
}

impl AgentController {
    pub fn new(messenger: Box<dyn Messenger + Send>, agent: Box<dyn DecisionAgent>) -> Self {
        Self {
            messenger,
            agent,
            view: WorldView::new(0),
        }
    }

    pub fn agent(&self) -> &dyn DecisionAgent {
        self.agent.as_ref()
    }

    /// Recover the agent, e.g. to export its policy after a run.
    pub fn into_agent(self) -> Box<dyn DecisionAgent> {
        self.agent
    }

    /// Serve until the peer disconnects.
    ///
    /// A disconnect is the normal end of a run and returns `Ok`; every other
    /// failure is fatal for this agent and propagates.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let msg = match self.messenger.receive() {
                Ok(msg) => msg,
                Err(Error::Disconnected { .. }) => return Ok(()),
                Err(e) => return Err(e),
            };
            let reply = self.handle(&msg)?;
            self.messenger.send(&reply)?;
        }
    }

    /// Answer one request. Exactly one reply per message, always.
    pub fn handle(&mut self, msg: &Message) -> Result<Message> {
        match msg {
            Message::GameStart(start) => {
                self.view.begin_episode(start.map_width, start.map_height);
                Ok(Message::Ack(AckMessage {}))
            }
            Message::State(state) => {
                let action = self.step(state)?;
                Ok(Message::Action(ActionReply { action }))
            }
            other => Err(Error::UnexpectedMessage {
                expected: "game_start or state",
                got: other.kind(),
            }),
        }
    }

    fn step(&mut self, msg: &StateMessage) -> Result<Direction> {
        self.view.apply(msg);
        self.agent.choose_action(
            &self.view,
            msg.executed_action,
            msg.reward,
            &msg.legal_actions,
            msg.test_mode,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;
    use crate::{
        agents::RandomAgent,
        protocol::{ChannelMessenger, GameStartMessage},
        types::Position,
    };

    fn controller() -> AgentController {
        let (_, server) = ChannelMessenger::pair();
        AgentController::new(Box::new(server), Box::new(RandomAgent::seeded(1)))
    }

    fn state_message() -> StateMessage {
        let mut agent_positions = BTreeMap::new();
        agent_positions.insert(0, Position::new(1, 1));
        let mut fragile_agents = BTreeMap::new();
        fragile_agents.insert(0, 0.0);
        StateMessage {
            agent_id: 0,
            agent_positions,
            food_positions: BTreeSet::new(),
            fragile_agents,
            wall_positions: BTreeSet::new(),
            legal_actions: vec![Direction::North, Direction::West],
            reward: 0.0,
            executed_action: Direction::Stop,
            test_mode: false,
        }
    }

    #[test]
    fn handshake_is_acknowledged() {
        let mut controller = controller();
        let reply = controller
            .handle(&Message::GameStart(GameStartMessage {
                agent_id: 0,
                map_width: 5,
                map_height: 5,
            }))
            .unwrap();
        assert_eq!(reply, Message::Ack(AckMessage {}));
    }

    #[test]
    fn state_messages_get_action_replies() {
        let mut controller = controller();
        let reply = controller.handle(&Message::State(state_message())).unwrap();
        match reply {
            Message::Action(ActionReply { action }) => {
                assert!([Direction::North, Direction::West].contains(&action));
            }
            other => panic!("expected action reply, got {other:?}"),
        }
    }

    #[test]
    fn reply_kinds_are_rejected_as_requests() {
        let mut controller = controller();
        let result = controller.handle(&Message::Ack(AckMessage {}));
        assert!(matches!(result, Err(Error::UnexpectedMessage { .. })));
    }
}
