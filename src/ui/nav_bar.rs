/// Navigation bar
///
/// Renders the controller's NavBar model verbatim: leading affordances,
/// centered title, trailing affordances. The controller owns which items
/// appear; this module only maps them to widgets and messages.

use iced::widget::{button, container, horizontal_space, row, text, Row};
use iced::{Alignment, Element, Length};

use crate::picker::controller::{NavBar, NavItem};
use crate::Message;

pub fn view(nav: &NavBar) -> Element<'_, Message> {
    let mut bar: Row<'_, Message> = row![]
        .spacing(8)
        .align_y(Alignment::Center)
        .padding([8.0, 12.0]);

    for item in &nav.leading {
        bar = bar.push(nav_button(item));
    }
    bar = bar.push(horizontal_space());
    bar = bar.push(text(&nav.title).size(16));
    bar = bar.push(horizontal_space());
    for item in &nav.trailing {
        bar = bar.push(nav_button(item));
    }

    container(bar).width(Length::Fill).into()
}

fn nav_button(item: &NavItem) -> Element<'_, Message> {
    match item {
        NavItem::Cancel => button("Cancel").on_press(Message::CancelPicker).into(),
        NavItem::Select => button("Select").on_press(Message::BeginEditing).into(),
        NavItem::Done => button("Done").on_press(Message::EndEditing).into(),
        NavItem::Open { enabled } => button("Open")
            .on_press_maybe(enabled.then_some(Message::OpenPicked))
            .into(),
        NavItem::SelectAll => button("Select All")
            .on_press(Message::ToggleSelectAll)
            .into(),
        NavItem::SelectNone => button("Select None")
            .on_press(Message::ToggleSelectAll)
            .into(),
    }
}
