use crate::core::profile::UserProfile;
use crate::core::user::User;
use crate::error::FitError;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Persistence boundary for the `User` aggregate. Writes replace the whole
/// record; the last writer wins.
pub trait UserStore {
    fn load(&self, email: &str) -> Result<Option<User>, FitError>;
    fn save(&mut self, user: &User) -> Result<(), FitError>;
    fn clear(&mut self, email: &str) -> Result<(), FitError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: BTreeMap<String, User>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemoryStore {
    fn load(&self, email: &str) -> Result<Option<User>, FitError> {
        Ok(self.users.get(email).cloned())
    }

    fn save(&mut self, user: &User) -> Result<(), FitError> {
        self.users.insert(user.email.clone(), user.clone());
        Ok(())
    }

    fn clear(&mut self, email: &str) -> Result<(), FitError> {
        self.users.remove(email);
        Ok(())
    }
}

/// All accounts in one JSON array on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<User>, FitError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Vec::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, users: &[User]) -> Result<(), FitError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(users)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl UserStore for JsonFileStore {
    fn load(&self, email: &str) -> Result<Option<User>, FitError> {
        Ok(self.read_all()?.into_iter().find(|u| u.email == email))
    }

    fn save(&mut self, user: &User) -> Result<(), FitError> {
        let mut users = self.read_all()?;
        match users.iter_mut().find(|u| u.email == user.email) {
            Some(existing) => *existing = user.clone(),
            None => users.push(user.clone()),
        }
        self.write_all(&users)
    }

    fn clear(&mut self, email: &str) -> Result<(), FitError> {
        let mut users = self.read_all()?;
        let before = users.len();
        users.retain(|u| u.email != email);
        if users.len() != before {
            self.write_all(&users)?;
        }
        Ok(())
    }
}

/// Application state handed to the views: the signed-in user and the store
/// behind it.
pub struct Session<S: UserStore> {
    store: S,
    current: Option<User>,
}

impl<S: UserStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self { store, current: None }
    }

    /// Loads the account, creating an empty one on first use.
    pub fn sign_in(&mut self, email: &str) -> Result<&User, FitError> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(FitError::InvalidInput(format!("Email inválido: '{email}'.")));
        }
        let user = match self.store.load(email)? {
            Some(user) => user,
            None => {
                log::info!("Creating account for {email}");
                let user = User::new(email);
                self.store.save(&user)?;
                user
            }
        };
        Ok(&*self.current.insert(user))
    }

    pub fn sign_out(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&User> {
        self.current.as_ref()
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.current.as_ref().and_then(|u| u.profile.as_ref())
    }

    pub fn update_user(&mut self, user: User) -> Result<(), FitError> {
        self.store.save(&user)?;
        self.current = Some(user);
        Ok(())
    }

    /// Applies `change` to a copy of the signed-in user and persists it.
    pub fn modify_user<F>(&mut self, change: F) -> Result<(), FitError>
    where
        F: FnOnce(&mut User),
    {
        let mut user = self
            .current
            .clone()
            .ok_or_else(|| FitError::InvalidInput("Nenhum usuário conectado.".into()))?;
        change(&mut user);
        self.update_user(user)
    }

    pub fn set_profile(&mut self, profile: UserProfile) -> Result<(), FitError> {
        self.modify_user(|user| user.profile = Some(profile))
    }

    /// Deletes the signed-in account from the store.
    pub fn delete_account(&mut self) -> Result<(), FitError> {
        if let Some(user) = &self.current {
            self.store.clear(&user.email)?;
        }
        self.current = None;
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
