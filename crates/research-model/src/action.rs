//! UI action family
//!
//! Actions attach behavior to the buttons of a step. Each variant is a plain
//! `serde` struct; the family registry picks the variant from the `"type"`
//! discriminator and [`encode_serde`] writes it back with the discriminator
//! first.

use std::any::Any;
use std::fmt;
use std::str::FromStr;

use research_serialization::{decode_serde, encode_serde, Document, SerializationError, SerializationResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Discriminators of the bundled action variants
pub mod action_type {
    /// Plain button
    pub const DEFAULT: &str = "default";
    /// Jump to another node
    pub const NAVIGATION: &str = "navigation";
    /// Schedule a reminder
    pub const REMINDER: &str = "reminder";
    /// Show a web page
    pub const WEB_VIEW: &str = "webView";
    /// Play a video
    pub const VIDEO_VIEW: &str = "videoView";
}

/// Button a UI action is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ButtonType {
    /// Continue to the next step
    GoForward,
    /// Return to the previous step
    GoBackward,
    /// Skip the current step
    Skip,
    /// Cancel the task
    Cancel,
    /// Show more information
    LearnMore,
    /// Show the instructions again
    ReviewInstructions,
}

impl ButtonType {
    /// Every button type
    pub const ALL: [Self; 6] = [
        Self::GoForward,
        Self::GoBackward,
        Self::Skip,
        Self::Cancel,
        Self::LearnMore,
        Self::ReviewInstructions,
    ];

    /// Key used in an `actions` map
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GoForward => "goForward",
            Self::GoBackward => "goBackward",
            Self::Skip => "skip",
            Self::Cancel => "cancel",
            Self::LearnMore => "learnMore",
            Self::ReviewInstructions => "reviewInstructions",
        }
    }
}

impl fmt::Display for ButtonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ButtonType {
    type Err = SerializationError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|button| button.as_str() == text)
            .ok_or_else(|| SerializationError::malformed(format!("unknown button type '{text}'")))
    }
}

/// Presentation shared by every action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonInfo {
    /// Button label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_title: Option<String>,
    /// Icon shown instead of, or next to, the label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_name: Option<String>,
    /// Bundle holding the icon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_identifier: Option<String>,
    /// Package holding the icon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
}

impl ButtonInfo {
    /// Info with a button label
    #[inline]
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            button_title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Info with an icon from a bundle
    #[inline]
    #[must_use]
    pub fn icon(icon_name: impl Into<String>, bundle_identifier: impl Into<String>) -> Self {
        Self {
            icon_name: Some(icon_name.into()),
            bundle_identifier: Some(bundle_identifier.into()),
            ..Self::default()
        }
    }
}

/// A UI action attached to a step button
pub trait UIAction: fmt::Debug + Send + Sync + Any {
    /// Discriminator written as `"type"`
    fn action_type(&self) -> &str;

    /// Presentation of the button
    fn button_info(&self) -> &ButtonInfo;

    /// Label used by this variant when the document sets none
    fn default_button_title(&self) -> Option<&str> {
        None
    }

    /// Label to show, falling back to [`UIAction::default_button_title`]
    fn button_title(&self) -> Option<&str> {
        self.button_info()
            .button_title
            .as_deref()
            .or_else(|| self.default_button_title())
    }

    /// Encode with the discriminator first
    ///
    /// # Errors
    /// `MalformedDocument` if the action cannot be written as an object
    fn encode(&self) -> SerializationResult<Document>;

    /// Upcast for downcasting
    fn as_any(&self) -> &dyn Any;
}

impl dyn UIAction {
    /// Borrow as a concrete action type
    #[inline]
    #[must_use]
    pub fn downcast_ref<T: UIAction>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

macro_rules! ui_action {
    ($action:ty, $type_name:expr) => {
        impl $action {
            /// Decode from a document node
            ///
            /// # Errors
            /// `MalformedDocument` if required fields are missing
            pub fn decode(value: &Value) -> SerializationResult<Self> {
                decode_serde(value)
            }
        }
    };
    ($action:ty, $type_name:expr, title) => {
        ui_action!($action, $type_name);

        impl UIAction for $action {
            fn action_type(&self) -> &str {
                $type_name
            }

            fn button_info(&self) -> &ButtonInfo {
                &self.info
            }

            fn encode(&self) -> SerializationResult<Document> {
                encode_serde($type_name, self)
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

/// Button with no behavior beyond its presentation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultAction {
    /// Presentation
    #[serde(flatten)]
    pub info: ButtonInfo,
}

ui_action!(DefaultAction, action_type::DEFAULT, title);

impl DefaultAction {
    /// Bundled example documents
    #[must_use]
    pub fn examples() -> Vec<Value> {
        vec![json!({
            "type": action_type::DEFAULT,
            "buttonTitle": "Continue"
        })]
    }
}

/// Button that jumps to another node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationAction {
    /// Node to jump to
    pub skip_to_identifier: String,
    /// Presentation
    #[serde(flatten)]
    pub info: ButtonInfo,
}

ui_action!(NavigationAction, action_type::NAVIGATION, title);

impl NavigationAction {
    /// Bundled example documents
    #[must_use]
    pub fn examples() -> Vec<Value> {
        vec![json!({
            "type": action_type::NAVIGATION,
            "skipToIdentifier": "nextSection",
            "buttonTitle": "Go, Dogs! Go"
        })]
    }
}

/// Button that schedules a reminder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderAction {
    /// Reminder to schedule
    pub reminder_identifier: String,
    /// Presentation
    #[serde(flatten)]
    pub info: ButtonInfo,
}

ui_action!(ReminderAction, action_type::REMINDER);

impl ReminderAction {
    /// Label used when none is set
    pub const DEFAULT_BUTTON_TITLE: &'static str = "Remind me later";

    /// Bundled example documents
    #[must_use]
    pub fn examples() -> Vec<Value> {
        vec![json!({
            "type": action_type::REMINDER,
            "reminderIdentifier": "foo",
            "buttonTitle": Self::DEFAULT_BUTTON_TITLE
        })]
    }
}

impl UIAction for ReminderAction {
    fn action_type(&self) -> &str {
        action_type::REMINDER
    }

    fn button_info(&self) -> &ButtonInfo {
        &self.info
    }

    fn default_button_title(&self) -> Option<&str> {
        Some(Self::DEFAULT_BUTTON_TITLE)
    }

    fn encode(&self) -> SerializationResult<Document> {
        encode_serde(action_type::REMINDER, self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Button that opens a web page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebViewAction {
    /// Page location, a bundled resource name or an absolute URL
    pub url: String,
    /// Show a back button inside the web view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses_back_button: Option<bool>,
    /// Title of the web view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Label of the close button
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_button_title: Option<String>,
    /// Presentation
    #[serde(flatten)]
    pub info: ButtonInfo,
}

ui_action!(WebViewAction, action_type::WEB_VIEW, title);

impl WebViewAction {
    /// Bundled example documents
    #[must_use]
    pub fn examples() -> Vec<Value> {
        vec![
            json!({
                "type": action_type::WEB_VIEW,
                "url": "About_Dogs.html",
                "title": "Dogs",
                "buttonTitle": "Go, Dogs! Go"
            }),
            json!({
                "type": action_type::WEB_VIEW,
                "url": "About_Dogs.html",
                "iconName": "iconInfo",
                "bundleIdentifier": "org.example.SharedResources"
            }),
        ]
    }
}

/// Button that plays a video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoViewAction {
    /// Video location
    pub url: String,
    /// Presentation
    #[serde(flatten)]
    pub info: ButtonInfo,
}

ui_action!(VideoViewAction, action_type::VIDEO_VIEW, title);

impl VideoViewAction {
    /// Bundled example documents
    #[must_use]
    pub fn examples() -> Vec<Value> {
        vec![
            json!({
                "type": action_type::VIDEO_VIEW,
                "url": "About_Dogs.mp4",
                "buttonTitle": "Go, Dogs! Go"
            }),
            json!({
                "type": action_type::VIDEO_VIEW,
                "url": "About_Dogs.mp4",
                "iconName": "iconInfo",
                "bundleIdentifier": "org.example.SharedResources"
            }),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reminder_defaults_button_title() {
        let action = ReminderAction::decode(&json!({"reminderIdentifier": "foo"})).unwrap();
        assert_eq!(action.button_title(), Some("Remind me later"));
        assert!(!action.encode().unwrap().contains_key("buttonTitle"));
    }

    #[test]
    fn set_title_wins_over_variant_default() {
        let action = ReminderAction::decode(&json!({"reminderIdentifier": "foo", "buttonTitle": "Later"})).unwrap();
        assert_eq!(action.button_title(), Some("Later"));
        assert_eq!(action.default_button_title(), Some("Remind me later"));

        let plain = DefaultAction::decode(&json!({})).unwrap();
        assert_eq!(plain.default_button_title(), None);
        assert_eq!(plain.button_title(), None);
        let titled = DefaultAction::decode(&json!({"buttonTitle": "Next"})).unwrap();
        assert_eq!(titled.button_title(), Some("Next"));
    }

    #[test]
    fn web_view_round_trip_keeps_type_first() {
        let example = &WebViewAction::examples()[0];
        let action = WebViewAction::decode(example).unwrap();
        let document = action.encode().unwrap();
        assert_eq!(document.keys().next().map(String::as_str), Some("type"));
        assert_eq!(&Value::Object(document), example);
    }

    #[test]
    fn navigation_requires_target() {
        assert!(NavigationAction::decode(&json!({"buttonTitle": "Next"})).is_err());
    }

    #[test]
    fn button_type_parses_keys() {
        assert_eq!("learnMore".parse::<ButtonType>().unwrap(), ButtonType::LearnMore);
        assert!("jump".parse::<ButtonType>().is_err());
        for button in ButtonType::ALL {
            assert_eq!(button.to_string().parse::<ButtonType>().unwrap(), button);
        }
    }
}
