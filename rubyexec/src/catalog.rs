use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Marker token in the preference list that enables falling back to the
/// first installed implementation.
pub const AUTOPICK: &str = "--autopick";

/// Every runtime name rubyexec knows how to launch.
///
/// Each name is also the file name of the runtime binary, installed next to
/// rubyexec itself.
#[derive(EnumString, Display, AsRefStr, EnumIter, Clone, Copy, PartialEq, Eq, Debug)]
#[strum(serialize_all = "lowercase")]
pub enum Implementation {
    Ruby18,
    Ruby19,
    Ruby20,
    Ruby21,
    Ruby22,
    Ruby23,
    Ruby24,
    Ruby25,
    Ruby26,
    Ruby27,
    Ruby30,
    Ruby31,
    Ruby32,
    Ruby33,
    Ruby34,
    Jruby,
    Rbx,
}

impl Implementation {
    pub fn lookup(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    pub fn name(&self) -> &str {
        self.as_ref()
    }
}

#[test]
fn test_names() {
    use strum::IntoEnumIterator;

    let names = Implementation::iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>();
    assert_eq!(names.first().map(String::as_str), Some("ruby18"));
    assert!(names.iter().any(|n| n == "jruby"));
    assert!(names.iter().any(|n| n == "rbx"));
    for name in &names {
        assert_eq!(Implementation::lookup(name).unwrap().name(), name);
    }
}

#[test]
fn test_lookup_is_exact() {
    assert_eq!(Implementation::lookup("ruby27"), Some(Implementation::Ruby27));
    assert_eq!(Implementation::lookup("Ruby27"), None);
    assert_eq!(Implementation::lookup("ruby"), None);
    assert_eq!(Implementation::lookup(" ruby27"), None);
    assert_eq!(Implementation::lookup(AUTOPICK), None);
    assert_eq!(Implementation::lookup(""), None);
}
