//! Message and modal components.
//!
//! A component payload is a tree: action rows, sections, containers and
//! labels own further components. Every node keeps the raw fields it was
//! received with, so that [`Component::to_json`] gives back the payload it was
//! built from, fields this crate knows nothing about included.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

use super::base::hex_color;
use super::{ChannelType, Emoji, ToJson};
use crate::{Error, Object, Result};

/// The type of a component.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub enum ComponentType {
    /// A container for other components.
    ActionRow,
    /// A button.
    Button,
    /// A select menu for picking from predefined text options.
    StringSelect,
    /// A text input in a modal.
    TextInput,
    /// A select menu for users.
    UserSelect,
    /// A select menu for roles.
    RoleSelect,
    /// A select menu for users and roles.
    MentionableSelect,
    /// A select menu for channels.
    ChannelSelect,
    /// Text with an accessory.
    Section,
    /// Markdown text.
    TextDisplay,
    /// A small image next to a section.
    Thumbnail,
    /// A gallery of images and videos.
    MediaGallery,
    /// An attached file.
    File,
    /// Vertical padding between components.
    Separator,
    /// A visually grouped set of components.
    Container,
    /// A label and description around a modal field.
    Label,
    /// A file upload field in a modal.
    FileUpload,
    /// A component type this crate does not know about.
    Unknown(u64),
}

impl From<u64> for ComponentType {
    fn from(value: u64) -> Self {
        match value {
            1 => ComponentType::ActionRow,
            2 => ComponentType::Button,
            3 => ComponentType::StringSelect,
            4 => ComponentType::TextInput,
            5 => ComponentType::UserSelect,
            6 => ComponentType::RoleSelect,
            7 => ComponentType::MentionableSelect,
            8 => ComponentType::ChannelSelect,
            9 => ComponentType::Section,
            10 => ComponentType::TextDisplay,
            11 => ComponentType::Thumbnail,
            12 => ComponentType::MediaGallery,
            13 => ComponentType::File,
            14 => ComponentType::Separator,
            17 => ComponentType::Container,
            18 => ComponentType::Label,
            19 => ComponentType::FileUpload,
            other => ComponentType::Unknown(other),
        }
    }
}

impl From<ComponentType> for u64 {
    fn from(kind: ComponentType) -> u64 {
        match kind {
            ComponentType::ActionRow => 1,
            ComponentType::Button => 2,
            ComponentType::StringSelect => 3,
            ComponentType::TextInput => 4,
            ComponentType::UserSelect => 5,
            ComponentType::RoleSelect => 6,
            ComponentType::MentionableSelect => 7,
            ComponentType::ChannelSelect => 8,
            ComponentType::Section => 9,
            ComponentType::TextDisplay => 10,
            ComponentType::Thumbnail => 11,
            ComponentType::MediaGallery => 12,
            ComponentType::File => 13,
            ComponentType::Separator => 14,
            ComponentType::Container => 17,
            ComponentType::Label => 18,
            ComponentType::FileUpload => 19,
            ComponentType::Unknown(other) => other,
        }
    }
}

impl ComponentType {
    /// Whether this is one of the select menu types.
    pub fn is_select_menu(self) -> bool {
        matches!(
            self,
            ComponentType::StringSelect
                | ComponentType::UserSelect
                | ComponentType::RoleSelect
                | ComponentType::MentionableSelect
                | ComponentType::ChannelSelect
        )
    }
}

/// An option of a string select menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectMenuOption {
    /// The user-facing name of the option.
    pub label: String,
    /// The value sent to the bot when the option is picked.
    pub value: String,
    /// An additional description of the option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The emoji shown next to the option.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<Emoji>,
    /// Whether the option is selected by default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
}

/// A piece of media referenced by a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnfurledMediaItem {
    /// A URL, or an `attachment://` reference.
    pub url: String,
    /// The proxied URL, set by Discord.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
    /// The height of the media.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
    /// The width of the media.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,
    /// The media type of the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

// Field access

fn field<'a>(data: &'a Object, key: &str) -> Option<&'a Value> {
    data.get(key).filter(|value| !value.is_null())
}

fn str_field<'a>(data: &'a Object, key: &str) -> Option<&'a str> {
    field(data, key).and_then(Value::as_str)
}

fn bool_field(data: &Object, key: &str) -> Option<bool> {
    field(data, key).and_then(Value::as_bool)
}

fn u64_field(data: &Object, key: &str) -> Option<u64> {
    field(data, key).and_then(Value::as_u64)
}

fn typed_field<T: for<'de> Deserialize<'de>>(data: &Object, key: &str) -> Option<T> {
    field(data, key).and_then(|value| T::deserialize(value).ok())
}

/// Take the children stored under `key` out of a payload.
///
/// `None` when the key was absent, so that serializing does not invent it.
fn take_children(data: &mut Object, key: &str) -> Result<Option<Vec<Component>>> {
    match data.remove(key) {
        None => Ok(None),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(Component::from_value)
            .collect::<Result<Vec<_>>>()
            .map(Some),
        Some(other) => Err(Error::Decode("Expected an array of components", other)),
    }
}

fn take_child(data: &mut Object, key: &str) -> Result<Option<Box<Component>>> {
    data.remove(key)
        .map(|value| Component::from_value(value).map(Box::new))
        .transpose()
}

fn put_children(data: &mut Object, key: &str, children: &Option<Vec<Component>>) {
    if let Some(ref children) = children {
        data.insert(
            key.to_owned(),
            Value::Array(children.iter().map(Component::to_json).collect()),
        );
    }
}

fn put_child(data: &mut Object, key: &str, child: &Option<Box<Component>>) {
    if let Some(ref child) = child {
        data.insert(key.to_owned(), child.to_json());
    }
}

macro_rules! leaf_component {
    ($(#[$attr:meta] $name:ident;)*) => {
        $(
            #[$attr]
            #[derive(Debug, Clone, PartialEq)]
            pub struct $name {
                data: Object,
            }

            impl $name {
                /// The raw fields of the component.
                pub fn data(&self) -> &Object {
                    &self.data
                }
            }
        )*
    };
}

leaf_component! {
    /// A button, either interactive, a link or a premium purchase button.
    Button;
    /// A select menu of any kind.
    SelectMenu;
    /// A text input in a modal.
    TextInput;
    /// Markdown text.
    TextDisplay;
    /// A small image shown as the accessory of a section.
    Thumbnail;
    /// An attached file shown in a message.
    FileComponent;
    /// Vertical padding and an optional divider line.
    Separator;
    /// A file upload field in a modal.
    FileUpload;
    /// One image or video of a media gallery.
    MediaGalleryItem;
}

impl Button {
    /// The button style.
    pub fn style(&self) -> Option<u64> {
        u64_field(&self.data, "style")
    }

    /// The text on the button.
    pub fn label(&self) -> Option<&str> {
        str_field(&self.data, "label")
    }

    /// The emoji on the button.
    pub fn emoji(&self) -> Option<Emoji> {
        typed_field(&self.data, "emoji")
    }

    /// The custom ID of an interactive button.
    pub fn custom_id(&self) -> Option<&str> {
        str_field(&self.data, "custom_id")
    }

    /// The URL of a link button.
    pub fn url(&self) -> Option<&str> {
        str_field(&self.data, "url")
    }

    /// The SKU of a premium button.
    pub fn sku_id(&self) -> Option<&str> {
        str_field(&self.data, "sku_id")
    }

    /// Whether the button is disabled.
    pub fn disabled(&self) -> bool {
        bool_field(&self.data, "disabled").unwrap_or(false)
    }
}

impl SelectMenu {
    /// Which kind of select menu this is.
    pub fn kind(&self) -> ComponentType {
        u64_field(&self.data, "type")
            .map(ComponentType::from)
            .unwrap_or(ComponentType::StringSelect)
    }

    /// The custom ID of the menu.
    pub fn custom_id(&self) -> Option<&str> {
        str_field(&self.data, "custom_id")
    }

    /// The text shown when nothing is selected.
    pub fn placeholder(&self) -> Option<&str> {
        str_field(&self.data, "placeholder")
    }

    /// The minimum number of items that must be chosen.
    pub fn min_values(&self) -> Option<u64> {
        u64_field(&self.data, "min_values")
    }

    /// The maximum number of items that can be chosen.
    pub fn max_values(&self) -> Option<u64> {
        u64_field(&self.data, "max_values")
    }

    /// The options of a string select menu.
    pub fn options(&self) -> Vec<SelectMenuOption> {
        typed_field(&self.data, "options").unwrap_or_default()
    }

    /// The channel types a channel select menu offers.
    pub fn channel_types(&self) -> Vec<ChannelType> {
        typed_field(&self.data, "channel_types").unwrap_or_default()
    }

    /// Whether the menu is disabled.
    pub fn disabled(&self) -> bool {
        bool_field(&self.data, "disabled").unwrap_or(false)
    }
}

impl TextInput {
    /// The custom ID of the input.
    pub fn custom_id(&self) -> Option<&str> {
        str_field(&self.data, "custom_id")
    }

    /// The style of the input, short or paragraph.
    pub fn style(&self) -> Option<u64> {
        u64_field(&self.data, "style")
    }

    /// The label of the input.
    pub fn label(&self) -> Option<&str> {
        str_field(&self.data, "label")
    }

    /// The text in the input. Set on submitted modals.
    pub fn value(&self) -> Option<&str> {
        str_field(&self.data, "value")
    }

    /// The text shown while the input is empty.
    pub fn placeholder(&self) -> Option<&str> {
        str_field(&self.data, "placeholder")
    }

    /// Whether the input must be filled in.
    pub fn required(&self) -> bool {
        bool_field(&self.data, "required").unwrap_or(true)
    }

    /// The minimum input length.
    pub fn min_length(&self) -> Option<u64> {
        u64_field(&self.data, "min_length")
    }

    /// The maximum input length.
    pub fn max_length(&self) -> Option<u64> {
        u64_field(&self.data, "max_length")
    }
}

impl TextDisplay {
    /// The markdown text.
    pub fn content(&self) -> &str {
        str_field(&self.data, "content").unwrap_or_default()
    }
}

impl Thumbnail {
    /// The image.
    pub fn media(&self) -> Option<UnfurledMediaItem> {
        typed_field(&self.data, "media")
    }

    /// Alt text of the image.
    pub fn description(&self) -> Option<&str> {
        str_field(&self.data, "description")
    }

    /// Whether the image is blurred out.
    pub fn spoiler(&self) -> bool {
        bool_field(&self.data, "spoiler").unwrap_or(false)
    }
}

impl MediaGalleryItem {
    /// The image or video.
    pub fn media(&self) -> Option<UnfurledMediaItem> {
        typed_field(&self.data, "media")
    }

    /// Alt text of the media.
    pub fn description(&self) -> Option<&str> {
        str_field(&self.data, "description")
    }

    /// Whether the media is blurred out.
    pub fn spoiler(&self) -> bool {
        bool_field(&self.data, "spoiler").unwrap_or(false)
    }
}

impl FileComponent {
    /// The file, an `attachment://` reference.
    pub fn file(&self) -> Option<UnfurledMediaItem> {
        typed_field(&self.data, "file")
    }

    /// The name of the file.
    pub fn name(&self) -> Option<&str> {
        str_field(&self.data, "name")
    }

    /// The size of the file in bytes.
    pub fn size(&self) -> Option<u64> {
        u64_field(&self.data, "size")
    }

    /// Whether the file is blurred out.
    pub fn spoiler(&self) -> bool {
        bool_field(&self.data, "spoiler").unwrap_or(false)
    }
}

impl Separator {
    /// The size of the padding, `1` for small and `2` for large.
    pub fn spacing(&self) -> u64 {
        u64_field(&self.data, "spacing").unwrap_or(1)
    }

    /// Whether a divider line is shown.
    pub fn divider(&self) -> bool {
        bool_field(&self.data, "divider").unwrap_or(true)
    }
}

impl FileUpload {
    /// The custom ID of the field.
    pub fn custom_id(&self) -> Option<&str> {
        str_field(&self.data, "custom_id")
    }

    /// The minimum number of files.
    pub fn min_values(&self) -> Option<u64> {
        u64_field(&self.data, "min_values")
    }

    /// The maximum number of files.
    pub fn max_values(&self) -> Option<u64> {
        u64_field(&self.data, "max_values")
    }

    /// Whether a file must be uploaded.
    pub fn required(&self) -> bool {
        bool_field(&self.data, "required").unwrap_or(true)
    }

    /// The IDs of the uploaded attachments. Set on submitted modals.
    pub fn values(&self) -> Vec<String> {
        typed_field(&self.data, "values").unwrap_or_default()
    }
}

/// A row of up to five buttons, or a single select menu.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRow {
    data: Object,
    components: Option<Vec<Component>>,
}

impl ActionRow {
    /// The components in the row.
    pub fn components(&self) -> &[Component] {
        self.components.as_deref().unwrap_or_default()
    }
}

/// Text components with a thumbnail or button next to them.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    data: Object,
    components: Option<Vec<Component>>,
    accessory: Option<Box<Component>>,
}

impl Section {
    /// The text components of the section.
    pub fn components(&self) -> &[Component] {
        self.components.as_deref().unwrap_or_default()
    }

    /// The thumbnail or button next to the text.
    pub fn accessory(&self) -> Option<&Component> {
        self.accessory.as_deref()
    }
}

/// Components grouped together with an optional accent color bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    data: Object,
    components: Option<Vec<Component>>,
}

impl Container {
    /// The components in the container.
    pub fn components(&self) -> &[Component] {
        self.components.as_deref().unwrap_or_default()
    }

    /// The accent color, `None` when unset or `null`.
    pub fn accent_color(&self) -> Option<u32> {
        u64_field(&self.data, "accent_color").and_then(|color| u32::try_from(color).ok())
    }

    /// The accent color as `#rrggbb`.
    ///
    /// `None` unless the payload holds a number.
    pub fn hex_accent_color(&self) -> Option<String> {
        match self.data.get("accent_color") {
            Some(Value::Number(color)) => color
                .as_u64()
                .and_then(|color| u32::try_from(color).ok())
                .map(hex_color),
            _ => None,
        }
    }

    /// Whether the container is blurred out.
    pub fn spoiler(&self) -> bool {
        bool_field(&self.data, "spoiler").unwrap_or(false)
    }
}

/// A label and description wrapping one modal field.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    data: Object,
    component: Option<Box<Component>>,
}

impl Label {
    /// The label text.
    pub fn label(&self) -> Option<&str> {
        str_field(&self.data, "label")
    }

    /// The description under the label.
    pub fn description(&self) -> Option<&str> {
        str_field(&self.data, "description")
    }

    /// The wrapped field.
    pub fn component(&self) -> Option<&Component> {
        self.component.as_deref()
    }
}

/// A gallery of images and videos.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaGallery {
    data: Object,
    items: Option<Vec<MediaGalleryItem>>,
}

impl MediaGallery {
    /// The media in the gallery.
    pub fn items(&self) -> &[MediaGalleryItem] {
        self.items.as_deref().unwrap_or_default()
    }
}

/// A node of a component tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    /// An action row.
    ActionRow(ActionRow),
    /// A button.
    Button(Button),
    /// A select menu of any kind.
    SelectMenu(SelectMenu),
    /// A text input.
    TextInput(TextInput),
    /// A section.
    Section(Section),
    /// Markdown text.
    TextDisplay(TextDisplay),
    /// A thumbnail.
    Thumbnail(Thumbnail),
    /// A media gallery.
    MediaGallery(MediaGallery),
    /// A file.
    File(FileComponent),
    /// A separator.
    Separator(Separator),
    /// A container.
    Container(Container),
    /// A label around a modal field.
    Label(Label),
    /// A file upload field.
    FileUpload(FileUpload),
    /// A component of a type this crate does not know about, kept as received.
    Unknown(Object),
}

impl Component {
    /// Build a component tree from its payload.
    pub fn from_value(value: Value) -> Result<Component> {
        match value {
            Value::Object(data) => Component::from_object(data),
            other => Err(Error::Decode("Expected a component object", other)),
        }
    }

    fn from_object(mut data: Object) -> Result<Component> {
        let kind = u64_field(&data, "type")
            .map(ComponentType::from)
            .unwrap_or(ComponentType::Unknown(0));

        Ok(match kind {
            ComponentType::ActionRow => {
                let components = take_children(&mut data, "components")?;
                Component::ActionRow(ActionRow { data, components })
            }
            ComponentType::Section => {
                let components = take_children(&mut data, "components")?;
                let accessory = take_child(&mut data, "accessory")?;
                Component::Section(Section {
                    data,
                    components,
                    accessory,
                })
            }
            ComponentType::Container => {
                let components = take_children(&mut data, "components")?;
                Component::Container(Container { data, components })
            }
            ComponentType::Label => {
                let component = take_child(&mut data, "component")?;
                Component::Label(Label { data, component })
            }
            ComponentType::MediaGallery => {
                let items = match data.remove("items") {
                    None => None,
                    Some(Value::Array(items)) => Some(
                        items
                            .into_iter()
                            .map(|item| match item {
                                Value::Object(data) => Ok(MediaGalleryItem { data }),
                                other => Err(Error::Decode("Expected a media gallery item", other)),
                            })
                            .collect::<Result<Vec<_>>>()?,
                    ),
                    Some(other) => return Err(Error::Decode("Expected an array of media items", other)),
                };
                Component::MediaGallery(MediaGallery { data, items })
            }
            ComponentType::Button => Component::Button(Button { data }),
            ComponentType::StringSelect
            | ComponentType::UserSelect
            | ComponentType::RoleSelect
            | ComponentType::MentionableSelect
            | ComponentType::ChannelSelect => Component::SelectMenu(SelectMenu { data }),
            ComponentType::TextInput => Component::TextInput(TextInput { data }),
            ComponentType::TextDisplay => Component::TextDisplay(TextDisplay { data }),
            ComponentType::Thumbnail => Component::Thumbnail(Thumbnail { data }),
            ComponentType::File => Component::File(FileComponent { data }),
            ComponentType::Separator => Component::Separator(Separator { data }),
            ComponentType::FileUpload => Component::FileUpload(FileUpload { data }),
            ComponentType::Unknown(_) => {
                warn!("Unknown component type {:?}, keeping it as is", kind);
                Component::Unknown(data)
            }
        })
    }

    /// The raw fields of this node, children excluded.
    pub fn data(&self) -> &Object {
        match self {
            Component::ActionRow(c) => &c.data,
            Component::Button(c) => &c.data,
            Component::SelectMenu(c) => &c.data,
            Component::TextInput(c) => &c.data,
            Component::Section(c) => &c.data,
            Component::TextDisplay(c) => &c.data,
            Component::Thumbnail(c) => &c.data,
            Component::MediaGallery(c) => &c.data,
            Component::File(c) => &c.data,
            Component::Separator(c) => &c.data,
            Component::Container(c) => &c.data,
            Component::Label(c) => &c.data,
            Component::FileUpload(c) => &c.data,
            Component::Unknown(data) => data,
        }
    }

    /// The type of this node.
    pub fn kind(&self) -> ComponentType {
        u64_field(self.data(), "type")
            .map(ComponentType::from)
            .unwrap_or(ComponentType::Unknown(0))
    }

    /// The optional numeric identifier of the component within its message.
    pub fn id(&self) -> Option<u64> {
        u64_field(self.data(), "id")
    }

    /// The custom ID of an interactive component.
    pub fn custom_id(&self) -> Option<&str> {
        match self {
            Component::Button(_)
            | Component::SelectMenu(_)
            | Component::TextInput(_)
            | Component::FileUpload(_) => str_field(self.data(), "custom_id"),
            _ => None,
        }
    }

    /// The components directly owned by this node, in order.
    pub fn children(&self) -> Vec<&Component> {
        match self {
            Component::ActionRow(row) => row.components().iter().collect(),
            Component::Container(container) => container.components().iter().collect(),
            Component::Section(section) => section
                .components()
                .iter()
                .chain(section.accessory())
                .collect(),
            Component::Label(label) => label.component().into_iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Find the component with a custom ID in this tree, depth first.
    pub fn find(&self, custom_id: &str) -> Option<&Component> {
        if self.custom_id() == Some(custom_id) {
            return Some(self);
        }
        self.children()
            .into_iter()
            .find_map(|child| child.find(custom_id))
    }

    /// Whether this component serializes to the same payload as `other`,
    /// which may be another component or a raw payload.
    pub fn equals(&self, other: &impl ToJson) -> bool {
        self.to_json() == other.to_json()
    }

    /// The payload of the tree, children serialized in place.
    pub fn to_json(&self) -> Value {
        let mut data = self.data().clone();
        match self {
            Component::ActionRow(row) => put_children(&mut data, "components", &row.components),
            Component::Container(container) => {
                put_children(&mut data, "components", &container.components)
            }
            Component::Section(section) => {
                put_children(&mut data, "components", &section.components);
                put_child(&mut data, "accessory", &section.accessory);
            }
            Component::Label(label) => put_child(&mut data, "component", &label.component),
            Component::MediaGallery(gallery) => {
                if let Some(ref items) = gallery.items {
                    data.insert(
                        "items".to_owned(),
                        Value::Array(items.iter().map(|item| Value::Object(item.data.clone())).collect()),
                    );
                }
            }
            _ => {}
        }
        Value::Object(data)
    }
}

impl ToJson for Component {
    fn to_json(&self) -> Value {
        Component::to_json(self)
    }
}

/// Find a component by custom ID in a list of trees.
pub fn find_component<'a>(components: &'a [Component], custom_id: &str) -> Option<&'a Component> {
    components
        .iter()
        .find_map(|component| component.find(custom_id))
}

impl Serialize for Component {
    fn serialize<S: Serializer>(&self, s: S) -> ::std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(s)
    }
}

impl<'d> Deserialize<'d> for Component {
    fn deserialize<D: Deserializer<'d>>(d: D) -> ::std::result::Result<Self, D::Error> {
        Component::from_value(Value::deserialize(d)?).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn action_row_round_trip() {
        let payload = json!({
            "type": 1,
            "components": [{ "type": 2, "style": 1, "custom_id": "a", "label": "Go" }],
        });
        let row = Component::from_value(payload.clone()).unwrap();
        assert_eq!(row.kind(), ComponentType::ActionRow);
        assert_eq!(row.to_json(), payload);

        match row.children()[0] {
            Component::Button(button) => {
                assert_eq!(button.label(), Some("Go"));
                assert_eq!(button.custom_id(), Some("a"));
                assert_eq!(button.style(), Some(1));
                assert!(!button.disabled());
            }
            other => panic!("expected a button, got {:?}", other),
        }
    }

    #[test]
    fn zero_children_stay_empty() {
        let payload = json!({ "type": 17, "components": [] });
        let container = Component::from_value(payload.clone()).unwrap();
        assert!(container.children().is_empty());
        assert_eq!(container.to_json(), payload);

        // absent stays absent
        let bare = json!({ "type": 1 });
        assert_eq!(Component::from_value(bare.clone()).unwrap().to_json(), bare);
    }

    #[test]
    fn nested_round_trip() {
        let payload = json!({
            "type": 17,
            "id": 1,
            "accent_color": 0x5865f2,
            "components": [
                {
                    "type": 9,
                    "components": [{ "type": 10, "content": "# Hello" }],
                    "accessory": {
                        "type": 11,
                        "media": { "url": "https://example.com/a.png" },
                    },
                },
                { "type": 14, "divider": false, "spacing": 2 },
                {
                    "type": 12,
                    "items": [{ "media": { "url": "attachment://b.png" }, "spoiler": true }],
                },
                {
                    "type": 1,
                    "components": [
                        { "type": 3, "custom_id": "pick", "options": [{ "label": "A", "value": "a" }] },
                    ],
                },
            ],
        });
        let container = Component::from_value(payload.clone()).unwrap();
        assert_eq!(container.to_json(), payload);

        match container {
            Component::Container(ref c) => {
                assert_eq!(c.hex_accent_color().as_deref(), Some("#5865f2"));
                assert_eq!(c.components().len(), 4);
            }
            ref other => panic!("expected a container, got {:?}", other),
        }

        let menu = container.find("pick").unwrap();
        match menu {
            Component::SelectMenu(menu) => {
                assert_eq!(menu.kind(), ComponentType::StringSelect);
                assert_eq!(menu.options()[0].value, "a");
            }
            other => panic!("expected a select menu, got {:?}", other),
        }
        assert!(container.find("missing").is_none());
    }

    #[test]
    fn accent_color_is_type_checked() {
        let unset = Component::from_value(json!({ "type": 17, "accent_color": null, "components": [] }))
            .unwrap();
        match unset {
            Component::Container(ref c) => {
                assert_eq!(c.hex_accent_color(), None);
                assert_eq!(c.accent_color(), None);
            }
            _ => unreachable!(),
        }
        assert_eq!(unset.to_json()["accent_color"], Value::Null);

        let bogus = Component::from_value(json!({ "type": 17, "accent_color": "red" })).unwrap();
        match bogus {
            Component::Container(ref c) => assert_eq!(c.hex_accent_color(), None),
            _ => unreachable!(),
        }

        let oversized = Component::from_value(json!({ "type": 17, "accent_color": 4294967296u64 }))
            .unwrap();
        match oversized {
            Component::Container(ref c) => {
                assert_eq!(c.accent_color(), None);
                assert_eq!(c.hex_accent_color(), None);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn equality() {
        let payload = json!({ "type": 2, "style": 5, "url": "https://discord.com", "label": "Open" });
        let a = Component::from_value(payload.clone()).unwrap();
        let b = Component::from_value(payload.clone()).unwrap();

        assert!(a.equals(&a));
        assert!(a.equals(&b) && b.equals(&a));
        assert!(a.equals(&payload));
        assert!(a.equals(&a.to_json()));
        assert_eq!(a, b);

        let other = Component::from_value(json!({ "type": 2, "style": 5, "url": "https://discord.com" }))
            .unwrap();
        assert!(!a.equals(&other));
    }

    #[test]
    fn unknown_types_are_kept() {
        let payload = json!({ "type": 99, "hologram": { "depth": 3 } });
        let unknown = Component::from_value(payload.clone()).unwrap();
        assert_eq!(unknown.kind(), ComponentType::Unknown(99));
        assert_eq!(unknown.to_json(), payload);

        // wider than a byte, must not wrap around to a known type
        let wide = json!({ "type": 257, "id": 3 });
        let unknown = Component::from_value(wide.clone()).unwrap();
        assert!(matches!(unknown, Component::Unknown(_)));
        assert_eq!(unknown.kind(), ComponentType::Unknown(257));
        assert_eq!(unknown.to_json(), wide);

        let odd_children = json!({ "type": 257, "components": 5 });
        let unknown = Component::from_value(odd_children.clone()).unwrap();
        assert_eq!(unknown.to_json(), odd_children);
        assert_eq!(serde_json::to_value(unknown.kind()).unwrap(), json!(257));
    }

    #[test]
    fn malformed_children_are_rejected() {
        let err = Component::from_value(json!({ "type": 1, "components": [7] })).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Decode);
    }
}
