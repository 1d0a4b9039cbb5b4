use std::convert::Infallible;
use std::sync::Arc;
use futures::{SinkExt, StreamExt};
use iced::subscription::{self, Subscription};
use log::{info, warn};

use crate::device::link::SerialLink;
use crate::device::types::LinkEvent;

async fn forward_events(link: Arc<dyn SerialLink>, mut output: futures::channel::mpsc::Sender<LinkEvent>) -> Infallible {
    match link.events().await {
        Ok(mut events) => {
            while let Some(event) = events.next().await {
                if output.send(event).await.is_err() {
                    break;
                }
            }
            info!("Bluetooth event stream ended");
        },
        Err(err) => warn!("Failed to subscribe to bluetooth events: {}", err),
    }

    // note: subscription::channel expects the future to never resolve (Infallible)
    futures::future::pending().await
}

pub fn link_event_subscription(link: Arc<dyn SerialLink>) -> Subscription<LinkEvent> {
    struct LinkEvents;

    subscription::channel(
        std::any::TypeId::of::<LinkEvents>(),
        64,
        move |output| forward_events(link, output),
    )
}
