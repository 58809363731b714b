//! Account operations: login, account creation, preferences, user groups.

use crate::params::RequestParams;
use crate::protocol::Document;
use crate::transport::Transport;
use crate::Result;
use tracing::info;

use super::core::Gateway;

impl<T: Transport> Gateway<T> {
    /// Log in. `domain` is for authentication plugins such as LDAP and
    /// defaults to `local`.
    ///
    /// The token round trip is handled by the engine; a rejected login is
    /// [`crate::Error::Unauthorized`].
    pub fn login(&mut self, username: &str, password: &str, domain: Option<&str>) -> Result<()> {
        self.execute(
            RequestParams::action("login")
                .with("lgname", username)
                .with("lgpassword", password)
                .with("lgdomain", domain.unwrap_or("local")),
            None,
        )?;
        self.session.record_login(username, password);
        info!(user = username, "logged in");
        Ok(())
    }

    /// Create an account. `params` carries `name`, `password`, `email`,
    /// `realname` and friends; the token round is handled by the engine.
    pub fn create_account(&mut self, params: RequestParams) -> Result<Document> {
        let response = self.execute(params.with("action", "createaccount"), None)?;
        let user = response
            .root()
            .child("createaccount")
            .and_then(|e| e.attr("username"))
            .unwrap_or_default();
        info!(user, "account created");
        Ok(response.document)
    }

    /// Change preferences of the logged-in user.
    ///
    /// `changes` are sent joined as `key=value|...`; `option` sets one
    /// preference whose value may contain `|`; `reset` restores defaults
    /// before applying anything else.
    pub fn set_options(
        &mut self,
        changes: &[(&str, &str)],
        option: Option<(&str, &str)>,
        reset: bool,
    ) -> Result<Document> {
        let token = self.options_token()?;
        let mut params = RequestParams::action("options")
            .with("token", token)
            .with_flag("reset", reset);
        if !changes.is_empty() {
            let change = changes
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("|");
            params.insert("change", change);
        }
        if let Some((name, value)) = option {
            params.insert("optionname", name);
            params.insert("optionvalue", value);
        }
        Ok(self.execute(params, None)?.document)
    }

    /// Add `user` to `add` and remove them from `remove`.
    pub fn set_groups(
        &mut self,
        user: &str,
        add: &[&str],
        remove: &[&str],
        reason: &str,
    ) -> Result<Document> {
        let token = self.user_rights_token(user)?;
        let params = RequestParams::action("userrights")
            .with("user", user)
            .with("token", token)
            .with("add", add.join("|"))
            .with("remove", remove.join("|"))
            .with("reason", reason);
        Ok(self.execute(params, None)?.document)
    }
}
