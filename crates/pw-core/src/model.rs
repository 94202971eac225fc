//! Widget data model for Panelwright projects.
//!
//! A project is a flat list of `Widget` values. Containment is expressed
//! purely through each widget's `parent_id` back-reference: there are no
//! owned child lists, and the parent/child relation is derived on demand
//! (see [`crate::tree::WidgetTree::children`]).
//!
//! Two position models coexist on every widget. `PositionMode::Absolute`
//! makes `(x, y)` authoritative; `PositionMode::Anchored` makes
//! `(anchor_x, anchor_y, offset_x, offset_y)` authoritative. The inactive
//! pair is *not* kept in sync and is only recomputed by an explicit
//! mode conversion.

use crate::id::WidgetId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ─── Colors ──────────────────────────────────────────────────────────────

/// 8-bit RGBA color, serialized as `#RRGGBB` or `#RRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Rgba {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA`. The `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let pair = |i: usize| -> Option<u8> { Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) };

        match bytes.len() {
            3 => Some(Self::rgba(
                hex_val(bytes[0])? * 17,
                hex_val(bytes[1])? * 17,
                hex_val(bytes[2])? * 17,
                255,
            )),
            6 => Some(Self::rgba(pair(0)?, pair(2)?, pair(4)?, 255)),
            8 => Some(Self::rgba(pair(0)?, pair(2)?, pair(4)?, pair(6)?)),
            _ => None,
        }
    }

    /// Emit `#RRGGBB` when opaque, `#RRGGBBAA` otherwise.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgba::from_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color `{s}`")))
    }
}

/// Four-sided box spacing (margin or padding), in design units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Spacing {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Spacing {
    pub const fn uniform(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }
}

// ─── Kinds ───────────────────────────────────────────────────────────────

/// The closed set of widget kinds the runtime renderer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    Button,
    Label,
    TextInput,
    Slider,
    ComboBox,
    CheckBox,
    RadioButton,
    Image,
    ListView,
    GridView,
    TableView,
    Panel,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 12] = [
        WidgetKind::Button,
        WidgetKind::Label,
        WidgetKind::TextInput,
        WidgetKind::Slider,
        WidgetKind::ComboBox,
        WidgetKind::CheckBox,
        WidgetKind::RadioButton,
        WidgetKind::Image,
        WidgetKind::ListView,
        WidgetKind::GridView,
        WidgetKind::TableView,
        WidgetKind::Panel,
    ];

    /// Lowercase type name used in project files and generated ids.
    pub const fn type_name(self) -> &'static str {
        match self {
            WidgetKind::Button => "button",
            WidgetKind::Label => "label",
            WidgetKind::TextInput => "textinput",
            WidgetKind::Slider => "slider",
            WidgetKind::ComboBox => "combobox",
            WidgetKind::CheckBox => "checkbox",
            WidgetKind::RadioButton => "radiobutton",
            WidgetKind::Image => "image",
            WidgetKind::ListView => "listview",
            WidgetKind::GridView => "gridview",
            WidgetKind::TableView => "tableview",
            WidgetKind::Panel => "panel",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_name() == name)
    }

    /// Size a freshly created widget of this kind gets.
    pub const fn default_size(self) -> (f32, f32) {
        match self {
            WidgetKind::Button => (120.0, 40.0),
            WidgetKind::Label => (120.0, 30.0),
            WidgetKind::TextInput => (200.0, 32.0),
            WidgetKind::Slider => (200.0, 30.0),
            WidgetKind::ComboBox => (200.0, 35.0),
            WidgetKind::CheckBox => (120.0, 30.0),
            WidgetKind::RadioButton => (150.0, 30.0),
            WidgetKind::Image => (128.0, 128.0),
            WidgetKind::ListView => (200.0, 150.0),
            WidgetKind::GridView => (300.0, 200.0),
            WidgetKind::TableView => (400.0, 300.0),
            WidgetKind::Panel => (300.0, 200.0),
        }
    }

    /// Whether widgets of this kind may be used as a re-parent target.
    pub const fn is_container(self) -> bool {
        matches!(self, WidgetKind::Panel)
    }
}

// ─── Positioning ─────────────────────────────────────────────────────────

/// Which set of position fields is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PositionMode {
    /// `(x, y)` relative to the container's origin.
    #[default]
    #[serde(rename = "absolute")]
    Absolute,
    /// Anchor point on the container plus `(offset_x, offset_y)`.
    #[serde(rename = "anchor")]
    Anchored,
}

/// Horizontal anchor reference on the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorX {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical anchor reference on the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorY {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl AnchorX {
    /// Position of this anchor along a container of width `extent`.
    pub fn resolve(self, extent: f32) -> f32 {
        match self {
            AnchorX::Left => 0.0,
            AnchorX::Center => extent / 2.0,
            AnchorX::Right => extent,
        }
    }
}

impl AnchorY {
    /// Position of this anchor along a container of height `extent`.
    pub fn resolve(self, extent: f32) -> f32 {
        match self {
            AnchorY::Top => 0.0,
            AnchorY::Middle => extent / 2.0,
            AnchorY::Bottom => extent,
        }
    }
}

/// The four edge-anchor flags, grouped for bulk edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeAnchors {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

// ─── Widget ──────────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_opacity() -> u8 {
    100
}

fn default_border_color() -> Rgba {
    Rgba::rgba(0x66, 0x66, 0x66, 255)
}

/// Parent references are stored as a plain string in project files, with
/// `""` (or the legacy `"root"`) meaning "top-level".
mod parent_ref {
    use crate::id::WidgetId;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(parent: &Option<WidgetId>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(parent.as_ref().map(WidgetId::as_str).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<WidgetId>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        Ok(raw
            .map(|s| WidgetId::intern(&s))
            .filter(|id| !id.is_surface_alias()))
    }
}

/// A single widget on the design surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: WidgetId,

    #[serde(rename = "type")]
    pub kind: WidgetKind,

    /// Weak reference to the containing widget. `None` = design surface.
    #[serde(default, with = "parent_ref")]
    pub parent_id: Option<WidgetId>,

    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,

    #[serde(default)]
    pub z_index: i32,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub interactive: bool,
    /// Own opacity in percent, 0..=100.
    #[serde(default = "default_opacity")]
    pub opacity: u8,

    #[serde(default)]
    pub position_mode: PositionMode,
    #[serde(default)]
    pub anchor_x: AnchorX,
    #[serde(default)]
    pub anchor_y: AnchorY,
    #[serde(default)]
    pub offset_x: f32,
    #[serde(default)]
    pub offset_y: f32,

    #[serde(default)]
    pub anchor_left: bool,
    #[serde(default)]
    pub anchor_right: bool,
    #[serde(default)]
    pub anchor_top: bool,
    #[serde(default)]
    pub anchor_bottom: bool,
    /// Gap to the container's right edge captured when `anchor_right` was enabled.
    #[serde(default)]
    pub design_margin_right: f32,
    /// Gap to the container's bottom edge captured when `anchor_bottom` was enabled.
    #[serde(default)]
    pub design_margin_bottom: f32,

    #[serde(default)]
    pub margin: Spacing,
    #[serde(default)]
    pub padding: Spacing,
    #[serde(default)]
    pub border_width: f32,
    #[serde(default = "default_border_color")]
    pub border_color: Rgba,
    #[serde(default)]
    pub border_radius: f32,
    #[serde(default)]
    pub background_color: Option<Rgba>,
    /// Resource-store id of a background image. Never resolved here.
    #[serde(default)]
    pub background_resource_id: Option<String>,
}

impl Widget {
    /// A widget of `kind` at local `(x, y)` with the kind's defaults applied.
    pub fn new(id: WidgetId, kind: WidgetKind, x: f32, y: f32) -> Self {
        let (width, height) = kind.default_size();
        Self {
            id,
            kind,
            parent_id: None,
            x,
            y,
            width,
            height,
            z_index: 0,
            visible: true,
            interactive: true,
            opacity: 100,
            position_mode: PositionMode::Absolute,
            anchor_x: AnchorX::Left,
            anchor_y: AnchorY::Top,
            offset_x: 0.0,
            offset_y: 0.0,
            anchor_left: false,
            anchor_right: false,
            anchor_top: false,
            anchor_bottom: false,
            design_margin_right: 0.0,
            design_margin_bottom: 0.0,
            margin: Spacing::default(),
            padding: Spacing::default(),
            border_width: 0.0,
            border_color: default_border_color(),
            border_radius: 0.0,
            background_color: None,
            background_resource_id: None,
        }
    }

    /// Builder-style parent assignment, used when constructing fixtures.
    pub fn with_parent(mut self, parent: WidgetId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn edge_anchors(&self) -> EdgeAnchors {
        EdgeAnchors {
            left: self.anchor_left,
            right: self.anchor_right,
            top: self.anchor_top,
            bottom: self.anchor_bottom,
        }
    }

    /// Own opacity as a 0.0..=1.0 factor.
    pub fn opacity_factor(&self) -> f32 {
        f32::from(self.opacity.min(100)) / 100.0
    }
}

// ─── Resolved geometry (output of the geometry resolver) ─────────────────

/// Absolute bounding box in design-surface coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResolvedBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ResolvedBounds {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Edge-inclusive point containment.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Shrink by `s` on every side (content box from padding).
    pub fn inset(&self, s: Spacing) -> Self {
        Self {
            x: self.x + s.left,
            y: self.y + s.top,
            width: (self.width - s.left - s.right).max(0.0),
            height: (self.height - s.top - s.bottom).max(0.0),
        }
    }

    /// Grow by `s` on every side (outer box from margin).
    pub fn outset(&self, s: Spacing) -> Self {
        Self {
            x: self.x - s.left,
            y: self.y - s.top,
            width: self.width + s.left + s.right,
            height: self.height + s.top + s.bottom,
        }
    }
}
