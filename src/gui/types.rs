use iced::Event;

use crate::config::types::Config;
use crate::device::types::LinkEvent;
use crate::remote::controller::Intent;
use crate::remote::state::Transition;

#[derive(Debug, Clone)]
pub enum Message {
    EventOccurred(Event),
    ConfigLoadComplete((Config, Option<String>)), // error message if loading failed
    NoticeConfirmed,
    Intent(Intent),
    Settled(Transition),
    LinkEvent(LinkEvent),
}
