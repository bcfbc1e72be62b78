use iced::widget::{button, column, container, image, mouse_area, svg, text, Column, Row};
use iced::alignment::{Horizontal, Vertical};
use iced::{event, keyboard, mouse, Background, Border, Element, Event, Length, Subscription, Task};
use iced_layershell::build_pattern::application;
use iced_layershell::to_layer_message;
use std::time::Duration;
use tracing::{debug, error, info, trace};

pub mod actions;
pub mod dismiss;
pub mod icons;
pub mod launch;
pub mod layout;
pub mod monitor_detection;
pub mod signals;
pub mod style;

use actions::{Action, ActionSettings};
use dismiss::DismissTimer;
use icons::{Icon, IconLookup};
use layout::{Alignment, Orientation, Placement};
use style::{StyleSheet, StyleSource};

/// Everything the bar needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct Settings {
    pub placement: Placement,
    pub icon_size: u32,
    pub icon_theme: String,
    pub output: Option<String>,
    pub style: String,
    pub close_delay: Duration,
    pub actions: ActionSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            placement: Placement::default(),
            icon_size: 48,
            icon_theme: "Adwaita".to_string(),
            output: None,
            style: "embed:style".to_string(),
            close_delay: dismiss::DEFAULT_CLOSE_DELAY,
            actions: ActionSettings::default(),
        }
    }
}

struct Button {
    action: Action,
    icon: Icon,
}

/// Application context owned by the event loop.
struct LogoutBar {
    buttons: Vec<Button>,
    style: StyleSheet,
    icon_size: u32,
    orientation: Orientation,
    alignment: Alignment,
    dismiss: DismissTimer<iced::task::Handle>,
}

impl LogoutBar {
    fn new(settings: &Settings, style: StyleSheet) -> Self {
        let lookup = IconLookup::new(&settings.icon_theme);
        let buttons = actions::build_actions(&settings.actions)
            .into_iter()
            .map(|action| {
                let icon = lookup.load(&action.icon, settings.icon_size);
                Button { action, icon }
            })
            .collect();

        Self {
            buttons,
            style,
            icon_size: settings.icon_size,
            orientation: settings.placement.orientation(),
            alignment: settings.placement.alignment,
            dismiss: DismissTimer::new(settings.close_delay),
        }
    }
}

#[to_layer_message]
#[derive(Debug, Clone)]
pub enum Message {
    PointerEntered,
    PointerLeft,
    CloseTimeout(u64),
    Launch(usize),
    Dismiss,
    Terminate,
}

pub fn run(settings: Settings) -> Result<(), iced_layershell::Error> {
    info!("Starting wlogoutbar with iced_layershell");

    let sheet = style::load_style(&StyleSource::parse(&settings.style));
    let bar = LogoutBar::new(&settings, sheet);

    let output = settings.output.as_deref().and_then(monitor_detection::resolve_target_output);
    let layer_settings = settings.placement.layer_settings(
        bar.buttons.len(),
        settings.icon_size,
        &bar.style,
        output,
    );
    debug!("Surface size {:?}, anchor {:?}", layer_settings.size, layer_settings.anchor);

    application(namespace, update, view)
        .layer_settings(layer_settings)
        .subscription(subscription)
        .style(appearance)
        .run_with(move || (bar, Task::none()))
}

fn namespace(_bar: &LogoutBar) -> String {
    String::from("wlogoutbar")
}

fn subscription(_bar: &LogoutBar) -> Subscription<Message> {
    Subscription::batch([event::listen_with(window_event), signals::termination_subscription()])
}

fn window_event(event: Event, _status: event::Status, _id: iced::window::Id) -> Option<Message> {
    match event {
        Event::Mouse(mouse::Event::CursorLeft) => Some(Message::PointerLeft),
        Event::Mouse(mouse::Event::CursorEntered) => Some(Message::PointerEntered),
        Event::Keyboard(keyboard::Event::KeyReleased {
            key: keyboard::Key::Named(keyboard::key::Named::Escape),
            ..
        }) => Some(Message::Dismiss),
        _ => None,
    }
}

fn update(bar: &mut LogoutBar, message: Message) -> Task<Message> {
    match message {
        Message::PointerLeft => {
            let mut armed = Task::none();
            bar.dismiss.schedule(|generation, delay| {
                let sleep = async move { tokio::time::sleep(delay).await };
                let (task, handle) =
                    Task::perform(sleep, move |_| Message::CloseTimeout(generation)).abortable();
                armed = task;
                handle
            });
            armed
        }

        Message::PointerEntered => {
            bar.dismiss.cancel();
            Task::none()
        }

        Message::CloseTimeout(generation) => {
            if bar.dismiss.expire(generation) {
                info!("Pointer left the bar, closing");
                iced::exit()
            } else {
                Task::none()
            }
        }

        Message::Launch(index) => {
            bar.dismiss.cancel();
            if let Some(button) = bar.buttons.get(index) {
                info!("Running {} action: '{}'", button.action.kind.name(), button.action.command);
                if let Err(e) = launch::launch(&button.action.command) {
                    error!("{:#}", e);
                }
            }
            iced::exit()
        }

        Message::Dismiss => {
            info!("Escape pressed, closing");
            iced::exit()
        }

        Message::Terminate => {
            bar.dismiss.cancel();
            iced::exit()
        }

        _ => {
            trace!("UPDATE: Unhandled message");
            Task::none()
        }
    }
}

fn view(bar: &LogoutBar) -> Element<'_, Message> {
    let style = &bar.style;
    let buttons = bar.buttons.iter().enumerate().map(|(index, b)| view_button(bar, index, b));

    let boxed: Element<'_, Message> = match bar.orientation {
        Orientation::Horizontal => Row::with_children(buttons)
            .spacing(style.inner_box.spacing)
            .align_y(Vertical::Center)
            .into(),
        Orientation::Vertical => Column::with_children(buttons)
            .spacing(style.inner_box.spacing)
            .align_x(Horizontal::Center)
            .into(),
    };

    let inner_style = style.inner_box.clone();
    let inner = container(boxed).padding(inner_style.padding).style(move |_theme: &iced::Theme| {
        container::Style {
            background: Some(Background::Color(inner_style.background)),
            border: Border { radius: inner_style.border_radius.into(), ..Default::default() },
            ..Default::default()
        }
    });

    let (align_x, align_y) = match (bar.orientation, bar.alignment) {
        (Orientation::Horizontal, Alignment::Start) => (Horizontal::Left, Vertical::Center),
        (Orientation::Horizontal, Alignment::End) => (Horizontal::Right, Vertical::Center),
        (Orientation::Vertical, Alignment::Start) => (Horizontal::Center, Vertical::Top),
        (Orientation::Vertical, Alignment::End) => (Horizontal::Center, Vertical::Bottom),
        (_, Alignment::Middle) => (Horizontal::Center, Vertical::Center),
    };

    let outer_style = style.outer_box.clone();
    let outer = container(inner)
        .width(Length::Fill)
        .height(Length::Fill)
        .padding(outer_style.padding)
        .align_x(align_x)
        .align_y(align_y)
        .style(move |_theme: &iced::Theme| container::Style {
            background: Some(Background::Color(outer_style.background)),
            border: Border { radius: outer_style.border_radius.into(), ..Default::default() },
            ..Default::default()
        });

    mouse_area(outer).on_enter(Message::PointerEntered).into()
}

fn view_button<'a>(bar: &'a LogoutBar, index: usize, b: &'a Button) -> Element<'a, Message> {
    let size = Length::Fixed(bar.icon_size as f32);
    let style = bar.style.button.clone();

    let icon: Element<'a, Message> = match &b.icon {
        Icon::Svg(handle) => svg(handle.clone()).width(size).height(size).into(),
        Icon::Raster(handle) => image(handle.clone()).width(size).height(size).into(),
    };

    let mut content = column![icon].spacing(style.label_spacing).align_x(Horizontal::Center);
    if !b.action.label.is_empty() {
        content = content.push(text(b.action.label.as_str()).size(style.font_size));
    }

    let (width, height) = layout::button_extent(bar.icon_size, &bar.style);
    let tile = button(container(content).center_x(Length::Fill).center_y(Length::Fill))
        .width(Length::Fixed(width as f32))
        .height(Length::Fixed(height as f32))
        .padding(style.padding)
        .on_press(Message::Launch(index))
        .style(move |_theme: &iced::Theme, status| {
            let background = match status {
                button::Status::Hovered => style.hover_background,
                button::Status::Pressed => style.pressed_background,
                button::Status::Active | button::Status::Disabled => style.background,
            };
            button::Style {
                background: Some(Background::Color(background)),
                text_color: style.text_color,
                border: Border { radius: style.border_radius.into(), ..Default::default() },
                ..Default::default()
            }
        });

    mouse_area(tile).on_enter(Message::PointerEntered).into()
}

fn appearance(bar: &LogoutBar, _theme: &iced::Theme) -> iced_layershell::Appearance {
    iced_layershell::Appearance {
        background_color: bar.style.window.background,
        text_color: bar.style.button.text_color,
    }
}
