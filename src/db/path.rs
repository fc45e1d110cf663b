use std::fmt;

/// The three per-user collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Collection {
    Expenses,
    Categories,
    Settings,
}

impl Collection {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Expenses => "expenses",
            Self::Categories => "categories",
            Self::Settings => "settings",
        }
    }
}

/// `artifacts/{appId}/users/{userId}/{collection}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CollectionPath(String);

impl CollectionPath {
    pub(crate) fn for_user(app_id: &str, user_id: &str, collection: Collection) -> Self {
        Self(format!(
            "{}/{}",
            user_root(app_id, user_id),
            collection.as_str()
        ))
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn doc(&self, id: &str) -> DocPath {
        DocPath {
            collection: self.clone(),
            id: id.to_string(),
        }
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct DocPath {
    pub collection: CollectionPath,
    pub id: String,
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

pub(crate) fn user_root(app_id: &str, user_id: &str) -> String {
    format!("artifacts/{app_id}/users/{user_id}")
}
