// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use crate::error::GraphError;
use crate::graph::arena::{arena_key, Arena};

arena_key!(
    /// Handle to a folder.
    FolderId,
    "folder"
);

#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    name: String,
    parent: Option<FolderId>,
    children: Vec<FolderId>,
}

impl Folder {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<FolderId> {
        self.parent
    }

    pub fn children(&self) -> &[FolderId] {
        &self.children
    }
}

/// The folder tree. The root has an empty name and is written as `/`.
pub struct Folders {
    folders: Arena<FolderId, Folder>,
    root: FolderId,
}

impl Default for Folders {
    fn default() -> Self {
        Folders::new()
    }
}

impl Folders {
    pub fn new() -> Folders {
        let mut folders = Arena::new();
        let root = folders.insert(Folder {
            name: String::new(),
            parent: None,
            children: Vec::new(),
        });
        Folders { folders, root }
    }

    pub fn root(&self) -> FolderId {
        self.root
    }

    pub fn get(&self, id: FolderId) -> Option<&Folder> {
        self.folders.get(id)
    }

    pub fn contains(&self, id: FolderId) -> bool {
        self.folders.contains(id)
    }

    fn folder(&self, id: FolderId) -> Result<&Folder, GraphError> {
        self.folders
            .get(id)
            .ok_or_else(|| GraphError::UnknownFolder(id.to_string()))
    }

    /// Finds a direct child folder by name.
    pub fn child(&self, parent: FolderId, name: &str) -> Option<FolderId> {
        self.folders.get(parent)?.children.iter().copied().find(|child| {
            self.folders
                .get(*child)
                .map_or(false, |folder| folder.name == name)
        })
    }

    /// Adds a folder. Uniqueness against the other objects in `parent` is
    /// checked by the caller; this only rejects duplicate folder names.
    pub fn add(&mut self, parent: FolderId, name: &str) -> Result<FolderId, GraphError> {
        self.folder(parent)?;
        if self.child(parent, name).is_some() {
            return Err(GraphError::DuplicateName(name.to_string()));
        }
        let id = self.folders.insert(Folder {
            name: name.to_string(),
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(parent) = self.folders.get_mut(parent) {
            parent.children.push(id);
        }
        Ok(id)
    }

    /// Removes a folder that has no child folders. The root can't be removed.
    pub fn remove(&mut self, id: FolderId) -> Result<Folder, GraphError> {
        let folder = self.folder(id)?;
        if id == self.root || !folder.children.is_empty() {
            return Err(GraphError::FolderNotEmpty(self.path(id)));
        }
        let parent = folder.parent;
        if let Some(parent) = parent.and_then(|p| self.folders.get_mut(p)) {
            parent.children.retain(|child| *child != id);
        }
        self.folders
            .remove(id)
            .ok_or_else(|| GraphError::UnknownFolder(id.to_string()))
    }

    pub(crate) fn rename(&mut self, id: FolderId, name: &str) -> Result<(), GraphError> {
        let parent = self.folder(id)?.parent;
        if let Some(parent) = parent {
            if self.child(parent, name).is_some_and(|other| other != id) {
                return Err(GraphError::DuplicateName(name.to_string()));
            }
        }
        if let Some(folder) = self.folders.get_mut(id) {
            folder.name = name.to_string();
        }
        Ok(())
    }

    /// The absolute path of a folder, ending in `/`.
    pub fn path(&self, id: FolderId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(folder) = current.and_then(|id| self.folders.get(id)) {
            if folder.parent.is_some() {
                names.push(folder.name.as_str());
            }
            current = folder.parent;
        }
        names.reverse();
        let mut path = String::from("/");
        for name in names {
            path.push_str(name);
            path.push('/');
        }
        path
    }

    /// Resolves a `/`-separated folder path. Empty segments are skipped, so
    /// `/a/b`, `a/b/` and `/a//b` are the same folder.
    pub fn find(&self, path: &str) -> Option<FolderId> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self.root, |folder, name| self.child(folder, name))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_tree() {
        let mut folders = Folders::new();
        let root = folders.root();
        assert_eq!(folders.path(root), "/");

        let a = folders.add(root, "a").unwrap();
        let b = folders.add(a, "b").unwrap();
        assert_eq!(folders.path(b), "/a/b/");
        assert_eq!(folders.find("/a/b"), Some(b));
        assert_eq!(folders.find("a//b/"), Some(b));
        assert_eq!(folders.find("/"), Some(root));
        assert_eq!(folders.find("/a/c"), None);

        assert_eq!(
            folders.add(root, "a"),
            Err(GraphError::DuplicateName("a".to_string()))
        );
        // The same name is fine in another folder.
        assert!(folders.add(b, "a").is_ok());
    }

    #[test]
    fn test_remove() {
        let mut folders = Folders::new();
        let root = folders.root();
        let a = folders.add(root, "a").unwrap();
        let b = folders.add(a, "b").unwrap();

        assert_eq!(folders.remove(a), Err(GraphError::FolderNotEmpty("/a/".to_string())));
        assert!(folders.remove(root).is_err());
        assert_eq!(folders.remove(b).map(|f| f.name().to_string()), Ok("b".to_string()));
        assert!(folders.remove(a).is_ok());
        assert!(!folders.contains(a));
        assert!(matches!(folders.remove(a), Err(GraphError::UnknownFolder(_))));
    }

    #[test]
    fn test_rename() {
        let mut folders = Folders::new();
        let root = folders.root();
        let a = folders.add(root, "a").unwrap();
        folders.add(root, "b").unwrap();
        assert!(folders.rename(a, "b").is_err());
        assert!(folders.rename(a, "a").is_ok());
        assert!(folders.rename(a, "c").is_ok());
        assert_eq!(folders.find("/c"), Some(a));
    }
}
