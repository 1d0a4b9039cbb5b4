use std::sync::Arc;
use iced::{Alignment, Application, Command, Element, Font, Length, Settings, Size, Subscription, window};
use iced::event::{self, Event};
use iced::font::Weight;
use iced::theme::{self, Theme};
use iced::widget::{Column, Space, button, column, container, row, scrollable, text, toggler};
use log::{error, info};

use crate::config::io::ConfigIO;
use crate::config::types::Config;
use crate::device::btle::BtleSerial;
use crate::device::command::MotionCommand;
use crate::device::fake::FakeSerial;
use crate::device::link::SerialLink;
use crate::device::types::Device;
use crate::error::AppRunError;
use crate::gui::style::{BarStyle, DeviceRowStyleSheet, TabButtonStyleSheet};
use crate::gui::subscription::link_event_subscription;
use crate::gui::types::Message;
use crate::remote::controller::{Controller, Intent};
use crate::remote::state::{RemoteState, Tab};

const TITLE: &str = "Bluetooth Serial Remote";

const BOLD: Font = Font {
    weight: Weight::Bold,
    ..Font::DEFAULT
};

pub struct ApplicationFlags {
    pub config_io: ConfigIO,
    /// Drive the in-memory link instead of the radio.
    pub demo: bool,
}

pub struct RemoteApplication {
    config_io: ConfigIO,
    demo: bool,

    // messages that the user must click away
    notices: Vec<String>,

    // created once the config is loaded
    controller: Option<Controller>,
}

impl RemoteApplication {
    fn before_close(&mut self) {
        if let Some(controller) = &mut self.controller {
            controller.shutdown();
        }
    }

    fn load_config(&self) -> Command<Message> {
        let config_io = self.config_io.clone();

        let fut = async move {
            match config_io.read().await {
                Ok(config) => (config, None),
                Err(err) => {
                    error!("Failed to load config: {:?}", &err);
                    (Config::default(), Some(format!("Failed to load config: {}", &err)))
                },
            }
        };

        Command::perform(fut, Message::ConfigLoadComplete)
    }

    fn make_link(&self, config: &Config) -> Arc<dyn SerialLink> {
        if self.demo {
            info!("Using the in-memory demo link");
            Arc::new(FakeSerial::demo())
        } else {
            Arc::new(BtleSerial::new(config.serial))
        }
    }

    fn dispatch(&mut self, intent: Intent) -> Command<Message> {
        let Some(controller) = &mut self.controller else {
            return Command::none();
        };

        match controller.begin(intent) {
            Some(pending) => Command::perform(pending, Message::Settled),
            None => Command::none(),
        }
    }
}

fn status_bar<'a>(state: &RemoteState) -> Element<'a, Message> {
    let label = if state.enabled { "disable" } else { "enable" };

    container(
        row![
            text(TITLE).size(16).font(BOLD),
            Space::with_width(Length::Fill),
            toggler(label.to_string(), state.enabled, |value| Message::Intent(Intent::ToggleBluetooth(value)))
                .text_size(12)
                .width(Length::Shrink),
        ]
        .align_items(Alignment::Center)
        .spacing(10),
    )
    .style(theme::Container::Custom(Box::new(BarStyle)))
    .width(Length::Fill)
    .height(56)
    .padding([0, 16])
    .center_y()
    .into()
}

fn tab_button<'a>(title: &'static str, tab: Tab, active: bool) -> Element<'a, Message> {
    button(
        text(title).size(14).width(Length::Fill).horizontal_alignment(iced::alignment::Horizontal::Center)
    )
    .style(theme::Button::Custom(Box::new(TabButtonStyleSheet { active })))
    .width(Length::FillPortion(1))
    .height(56)
    .on_press(Message::Intent(Intent::SelectTab(tab)))
    .into()
}

fn tab_bar<'a>(state: &RemoteState) -> Element<'a, Message> {
    row![
        tab_button("PAIRED DEVICES", Tab::PairedDevices, state.tab == Tab::PairedDevices),
        tab_button("MOVEMENT", Tab::Movement, state.tab == Tab::Movement),
    ]
    .width(Length::Fill)
    .into()
}

fn device_row<'a>(state: &RemoteState, device: &Device) -> Element<'a, Message> {
    let mut content = row![
        text(&device.name).font(BOLD),
        text(format!("<{}>", device.id)),
    ]
    .align_items(Alignment::Center)
    .spacing(10);

    if state.tab == Tab::PairedDevices && state.is_active_device(device) {
        content = content.push(text("connected"));
    }

    button(content)
        .style(theme::Button::Custom(Box::new(DeviceRowStyleSheet)))
        .width(Length::Fill)
        .height(48)
        .padding([0, 16])
        .on_press(Message::Intent(Intent::PressDevice(device.clone())))
        .into()
}

fn device_list<'a>(state: &RemoteState) -> Element<'a, Message> {
    let rows = Column::with_children(state.visible_devices().iter().map(|device| device_row(state, device)))
        .width(Length::Fill);

    let action: Element<Message> = match state.tab {
        Tab::PairedDevices if state.connected => raised_button("Disconnect", Message::Intent(Intent::Disconnect)),
        Tab::PairedDevices if state.connecting => text("Connecting…").into(),
        Tab::PairedDevices => Space::with_height(0).into(),
        Tab::Movement => raised_button("Discover", Message::Intent(Intent::StartDiscovery)),
    };

    column![
        scrollable(rows).height(Length::Fill),
        action,
    ]
    .align_items(Alignment::Center)
    .spacing(10)
    .height(Length::Fill)
    .into()
}

fn discovery_indicator<'a>() -> Element<'a, Message> {
    column![
        text("Discovering…").size(20),
        raised_button("Cancel Discovery", Message::Intent(Intent::CancelDiscovery)),
    ]
    .align_items(Alignment::Center)
    .spacing(15)
    .height(Length::Fill)
    .into()
}

fn raised_button<'a>(title: &str, on_press: Message) -> Element<'a, Message> {
    button(text(title.to_uppercase()).size(14))
        .style(theme::Button::Primary)
        .padding([8, 16])
        .on_press(on_press)
        .into()
}

fn pad_button<'a>(command: MotionCommand) -> Element<'a, Message> {
    raised_button(command.label(), Message::Intent(Intent::Send(command)))
}

fn motion_pad<'a>() -> Element<'a, Message> {
    column![
        pad_button(MotionCommand::Forward),
        row![
            pad_button(MotionCommand::Left),
            pad_button(MotionCommand::Stop),
            pad_button(MotionCommand::Right),
        ].spacing(10),
        pad_button(MotionCommand::Reverse),
    ]
    .align_items(Alignment::Center)
    .spacing(10)
    .into()
}

impl Application for RemoteApplication {
    type Executor = iced::executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = ApplicationFlags;

    fn new(flags: ApplicationFlags) -> (RemoteApplication, Command<Self::Message>) {
        let app = RemoteApplication {
            config_io: flags.config_io,
            demo: flags.demo,
            notices: Vec::new(),
            controller: None,
        };

        let command = app.load_config();
        (app, command)
    }

    fn title(&self) -> String {
        String::from(concat!("RC Remote ", env!("CARGO_PKG_VERSION")))
    }

    fn update(&mut self, message: Message) -> Command<Self::Message> {
        match message {
            Message::ConfigLoadComplete((config, error_message)) => {
                info!("Config load complete");
                if let Some(error_message) = error_message {
                    self.notices.push(error_message);
                }

                let link = self.make_link(&config);
                self.controller = Some(Controller::new(link));
                return self.dispatch(Intent::Initialize);
            },
            Message::NoticeConfirmed => {
                if !self.notices.is_empty() {
                    self.notices.remove(0);
                }
            },
            Message::EventOccurred(Event::Window(id, window::Event::CloseRequested)) => {
                info!("Close requested");
                self.before_close();
                return window::close(id);
            },
            Message::Intent(intent) => {
                return self.dispatch(intent);
            },
            Message::Settled(transition) => {
                if let Some(controller) = &mut self.controller {
                    controller.apply(transition);
                }
            },
            Message::LinkEvent(event) => {
                if let Some(controller) = &mut self.controller {
                    controller.handle_event(event);
                }
            },
            _ => {}
        }

        Command::none()
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![event::listen().map(Message::EventOccurred)];

        if let Some(controller) = &self.controller {
            subscriptions.push(link_event_subscription(controller.link()).map(Message::LinkEvent));
        }

        Subscription::batch(subscriptions)
    }

    fn view(&self) -> Element<Message> {
        if let Some(notice) = self.notices.first() {
            return container(
                column![
                    text(notice),

                    button(text("Okay"))
                        .on_press(Message::NoticeConfirmed),

                ].align_items(Alignment::Center).spacing(20),
            )
            .width(Length::Fill)
            .padding(20)
            .into()
        }

        let Some(controller) = &self.controller else {
            return container(text("Loading…"))
                .width(Length::Fill)
                .padding(20)
                .into();
        };
        let state = controller.state();

        let body = if state.discovering && state.tab == Tab::Movement {
            discovery_indicator()
        } else {
            device_list(state)
        };

        column![
            status_bar(state),
            tab_bar(state),
            container(body).padding(10).height(Length::Fill),
            container(motion_pad()).padding(20),
        ]
        .align_items(Alignment::Center)
        .width(Length::Fill)
        .into()
    }
}

pub fn run_application(config_io: ConfigIO, demo: bool) -> Result<(), AppRunError> {
    let flags = ApplicationFlags { config_io, demo };
    let mut settings = Settings::with_flags(flags);

    // handle exits ourselves (Event::CloseRequested)
    settings.id = Some("rc-remote".to_string());
    settings.window.exit_on_close_request = false;
    settings.window.size = Size::new(420.0, 720.0);

    // this function will call process::exit() unless there was a startup error
    RemoteApplication::run(settings)?;
    Ok(())
}
