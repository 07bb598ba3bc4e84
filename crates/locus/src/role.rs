//! WAI-ARIA roles understood by the role query strategy.

use crate::result::LocusError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! aria_roles {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// An accessible role, as used by `get_by_role` queries
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        #[allow(missing_docs)]
        pub enum AriaRole {
            $($variant),+
        }

        impl AriaRole {
            /// Every role, in declaration order
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The role name as it appears in a `role` attribute
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }

        impl FromStr for AriaRole {
            type Err = LocusError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(LocusError::UnsupportedRole { role: s.to_string() }),
                }
            }
        }
    };
}

aria_roles! {
    Alert => "alert",
    AlertDialog => "alertdialog",
    Application => "application",
    Article => "article",
    Banner => "banner",
    Blockquote => "blockquote",
    Button => "button",
    Caption => "caption",
    Cell => "cell",
    Checkbox => "checkbox",
    Code => "code",
    ColumnHeader => "columnheader",
    Combobox => "combobox",
    Complementary => "complementary",
    ContentInfo => "contentinfo",
    Definition => "definition",
    Deletion => "deletion",
    Dialog => "dialog",
    Directory => "directory",
    Document => "document",
    Emphasis => "emphasis",
    Feed => "feed",
    Figure => "figure",
    Form => "form",
    Generic => "generic",
    Grid => "grid",
    GridCell => "gridcell",
    Group => "group",
    Heading => "heading",
    Img => "img",
    Insertion => "insertion",
    Link => "link",
    List => "list",
    Listbox => "listbox",
    ListItem => "listitem",
    Log => "log",
    Main => "main",
    Marquee => "marquee",
    Math => "math",
    Meter => "meter",
    Menu => "menu",
    Menubar => "menubar",
    MenuItem => "menuitem",
    MenuItemCheckbox => "menuitemcheckbox",
    MenuItemRadio => "menuitemradio",
    Navigation => "navigation",
    None => "none",
    Note => "note",
    Option => "option",
    Paragraph => "paragraph",
    Presentation => "presentation",
    ProgressBar => "progressbar",
    Radio => "radio",
    RadioGroup => "radiogroup",
    Region => "region",
    Row => "row",
    RowGroup => "rowgroup",
    RowHeader => "rowheader",
    Scrollbar => "scrollbar",
    Search => "search",
    Searchbox => "searchbox",
    Separator => "separator",
    Slider => "slider",
    SpinButton => "spinbutton",
    Status => "status",
    Strong => "strong",
    Subscript => "subscript",
    Superscript => "superscript",
    Switch => "switch",
    Tab => "tab",
    Table => "table",
    TabList => "tablist",
    TabPanel => "tabpanel",
    Term => "term",
    Textbox => "textbox",
    Time => "time",
    Timer => "timer",
    Toolbar => "toolbar",
    Tooltip => "tooltip",
    Tree => "tree",
    TreeGrid => "treegrid",
    TreeItem => "treeitem",
}

impl AriaRole {
    /// Implicit role of an HTML element, following the HTML-AAM mapping for
    /// the elements page objects commonly target.
    #[must_use]
    pub fn implicit_for(tag: &str, input_type: Option<&str>, has_href: bool) -> Option<Self> {
        let role = match tag.to_ascii_lowercase().as_str() {
            "a" | "area" if has_href => Self::Link,
            "article" => Self::Article,
            "aside" => Self::Complementary,
            "button" | "summary" => Self::Button,
            "dialog" => Self::Dialog,
            "footer" => Self::ContentInfo,
            "form" => Self::Form,
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Self::Heading,
            "header" => Self::Banner,
            "hr" => Self::Separator,
            "img" => Self::Img,
            "li" => Self::ListItem,
            "main" => Self::Main,
            "nav" => Self::Navigation,
            "ol" | "ul" => Self::List,
            "option" => Self::Option,
            "p" => Self::Paragraph,
            "progress" => Self::ProgressBar,
            "select" => Self::Combobox,
            "table" => Self::Table,
            "tbody" | "thead" | "tfoot" => Self::RowGroup,
            "td" => Self::Cell,
            "textarea" => Self::Textbox,
            "th" => Self::ColumnHeader,
            "tr" => Self::Row,
            "input" => match input_type.unwrap_or("text").to_ascii_lowercase().as_str() {
                "button" | "submit" | "reset" | "image" => Self::Button,
                "checkbox" => Self::Checkbox,
                "radio" => Self::Radio,
                "range" => Self::Slider,
                "number" => Self::SpinButton,
                "search" => Self::Searchbox,
                "hidden" => return None,
                _ => Self::Textbox,
            },
            _ => return None,
        };
        Some(role)
    }

    /// Heading level implied by an `h1`..`h6` tag
    #[must_use]
    pub fn implicit_level(tag: &str) -> Option<u32> {
        let tag = tag.to_ascii_lowercase();
        let digit = tag.strip_prefix('h')?;
        match digit.parse::<u32>() {
            Ok(level @ 1..=6) => Some(level),
            _ => None,
        }
    }
}

impl fmt::Display for AriaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_roles() {
        assert_eq!("button".parse::<AriaRole>().unwrap(), AriaRole::Button);
        assert_eq!(" Heading ".parse::<AriaRole>().unwrap(), AriaRole::Heading);
        assert_eq!(
            "menuitemcheckbox".parse::<AriaRole>().unwrap(),
            AriaRole::MenuItemCheckbox
        );
    }

    #[test]
    fn test_parse_unknown_role() {
        let err = "buton".parse::<AriaRole>().unwrap_err();
        assert!(matches!(err, LocusError::UnsupportedRole { ref role } if role == "buton"));
    }

    #[test]
    fn test_round_trip_all_names() {
        for role in AriaRole::ALL {
            assert_eq!(role.as_str().parse::<AriaRole>().unwrap(), *role);
        }
    }

    #[test]
    fn test_implicit_roles() {
        assert_eq!(
            AriaRole::implicit_for("button", None, false),
            Some(AriaRole::Button)
        );
        assert_eq!(
            AriaRole::implicit_for("input", Some("checkbox"), false),
            Some(AriaRole::Checkbox)
        );
        assert_eq!(
            AriaRole::implicit_for("input", None, false),
            Some(AriaRole::Textbox)
        );
        assert_eq!(AriaRole::implicit_for("a", None, false), None);
        assert_eq!(AriaRole::implicit_for("a", None, true), Some(AriaRole::Link));
        assert_eq!(AriaRole::implicit_for("input", Some("hidden"), false), None);
        assert_eq!(AriaRole::implicit_for("div", None, false), None);
    }

    #[test]
    fn test_implicit_level() {
        assert_eq!(AriaRole::implicit_level("h2"), Some(2));
        assert_eq!(AriaRole::implicit_level("H6"), Some(6));
        assert_eq!(AriaRole::implicit_level("h7"), None);
        assert_eq!(AriaRole::implicit_level("header"), None);
    }
}
