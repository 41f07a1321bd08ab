use async_graphql::SimpleObject;

const DIGITS: [char; 10] = ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9'];

const ADJECTIVES: [&str; 10] = [
    "quiet", "lonely", "bright", "rapid", "silent", "golden", "fuzzy", "gentle", "brave", "lucky",
];
const NOUNS: [&str; 10] = [
    "guitar", "rock", "amp", "band", "stage", "chord", "riff", "drum", "tune", "pick",
];
const TLDS: [&str; 5] = ["com", "net", "org", "io", "dev"];
const VERBS: [&str; 5] = ["Streamlined", "Reactive", "Decentralized", "Adaptive", "Robust"];
const OBJECTS: [&str; 5] = [
    "toolset",
    "framework",
    "interface",
    "pipeline",
    "middleware",
];

/// A package served by the demo schema.
#[derive(SimpleObject, Debug, Clone, PartialEq)]
pub struct Package {
    pub scheme: String,
    pub id: String,
    pub uri: String,
    pub name: String,
    pub description: String,
    pub handles: Vec<Package>,
}

impl Package {
    pub fn new(name: impl Into<String>, id: impl Into<String>, description: impl Into<String>) -> Self {
        let name = name.into();
        let id = id.into();
        let scheme = scheme_of(&name);
        Self {
            uri: format!("{}:{}", scheme, id),
            scheme,
            id,
            name,
            description: description.into(),
            handles: Vec::new(),
        }
    }

    /// A package with a random 5-digit id and a name and description
    /// derived from it.
    pub fn fake() -> Self {
        let id = nanoid::nanoid!(5, &DIGITS);
        let digits: Vec<usize> = id
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(|d| d as usize)
            .collect();
        let pick = |i: usize| digits.get(i).copied().unwrap_or(0);

        let name = format!(
            "{}-{}.{}",
            ADJECTIVES[pick(0) % ADJECTIVES.len()],
            NOUNS[pick(1) % NOUNS.len()],
            TLDS[pick(2) % TLDS.len()]
        );
        let description = format!(
            "{} {} {}",
            VERBS[pick(3) % VERBS.len()],
            NOUNS[pick(4) % NOUNS.len()],
            OBJECTS[pick(0) % OBJECTS.len()]
        );
        Self::new(name, id, description)
    }
}

/// First letter of every `-`-separated part of a name.
pub fn scheme_of(name: &str) -> String {
    name.split('-').filter_map(|part| part.chars().next()).collect()
}

pub fn fake_packages(count: usize) -> Vec<Package> {
    (0..count).map(|_| Package::fake()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_of() {
        assert_eq!(scheme_of("quiet-guitar.com"), "qg");
        assert_eq!(scheme_of("single"), "s");
        assert_eq!(scheme_of(""), "");
    }

    #[test]
    fn test_new_builds_uri() {
        let package = Package::new("lonely-rock.dev", "12345", "A package");
        assert_eq!(package.scheme, "lr");
        assert_eq!(package.uri, "lr:12345");
        assert!(package.handles.is_empty());
    }

    #[test]
    fn test_fake_package_shape() {
        for package in fake_packages(20) {
            assert_eq!(package.id.len(), 5);
            assert!(package.id.chars().all(|c| c.is_ascii_digit()));
            assert_eq!(package.uri, format!("{}:{}", package.scheme, package.id));
            assert!(package.name.contains('.'));
        }
    }
}
