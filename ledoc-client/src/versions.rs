use crate::api::DocumentVersion;

#[derive(Debug, Eq, PartialEq)]
pub enum Selection<'a> {
    Found(&'a DocumentVersion),

    /// The requested version does not exist, the latest one was picked instead
    Fallback {
        requested: i64,
        latest: &'a DocumentVersion,
    },

    /// The document has no version at all
    Empty,
}

impl<'a> Selection<'a> {
    pub fn version(&self) -> Option<&'a DocumentVersion> {
        match *self {
            Selection::Found(v) => Some(v),
            Selection::Fallback { latest, .. } => Some(latest),
            Selection::Empty => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeleteCheck {
    Proceed,

    /// This is the only version, deleting it deletes the whole document
    ConfirmDeletesDocument,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VersionHistory {
    // sorted by increasing version_number
    versions: Vec<DocumentVersion>,
}

impl VersionHistory {
    pub fn new(mut versions: Vec<DocumentVersion>) -> VersionHistory {
        versions.sort_by_key(|v| v.version_number);
        VersionHistory { versions }
    }

    pub fn versions(&self) -> &[DocumentVersion] {
        &self.versions
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn latest(&self) -> Option<&DocumentVersion> {
        self.versions.last()
    }

    pub fn get(&self, version_number: i64) -> Option<&DocumentVersion> {
        self.versions
            .binary_search_by_key(&version_number, |v| v.version_number)
            .ok()
            .map(|i| &self.versions[i])
    }

    /// The version to display: `requested` if any and present, the latest
    /// one otherwise
    pub fn select(&self, requested: Option<i64>) -> Selection<'_> {
        let latest = match self.latest() {
            None => return Selection::Empty,
            Some(l) => l,
        };
        match requested {
            None => Selection::Found(latest),
            Some(n) => match self.get(n) {
                Some(v) => Selection::Found(v),
                None => Selection::Fallback {
                    requested: n,
                    latest,
                },
            },
        }
    }

    pub fn delete_check(&self, version_number: i64) -> DeleteCheck {
        match &self.versions[..] {
            [only] if only.version_number == version_number => DeleteCheck::ConfirmDeletesDocument,
            _ => DeleteCheck::Proceed,
        }
    }
}
