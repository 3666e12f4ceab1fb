//! Handlebars templates for the settings page and the block page.
//!
//! Double-stash values are HTML-escaped by handlebars. Triple-stash is kept for
//! the admin-authored maintenance message only.

use crate::{core::settings::MaintenanceSettings, errors::Result};
use handlebars::Handlebars;
use serde::Serialize;

const SETTINGS_TEMPLATE_NAME: &str = "settings";
const BLOCKED_TEMPLATE_NAME: &str = "blocked";

const SETTINGS_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Maintenance Mode Settings</title>
</head>
<body>
<div class="wrap">
  <h1>Maintenance Mode Settings</h1>
  {{#if updated}}<div class="notice notice-success"><p>Settings saved.</p></div>{{/if}}
  <form method="post" action="{{action}}">
    <h2>General Settings</h2>
    <p>Configure maintenance mode settings.</p>
    <table class="form-table">
      <tr>
        <th><label for="enable_maintenance_mode">Enable Maintenance Mode</label></th>
        <td><input type="checkbox" id="enable_maintenance_mode" name="enable_maintenance_mode" value="1"{{#if settings.enabled}} checked="checked"{{/if}} /></td>
      </tr>
      <tr>
        <th><label for="maintenance_start">Maintenance Start Time</label></th>
        <td><input type="datetime-local" id="maintenance_start" name="maintenance_start" value="{{settings.window_start}}" /></td>
      </tr>
      <tr>
        <th><label for="maintenance_end">Maintenance End Time</label></th>
        <td><input type="datetime-local" id="maintenance_end" name="maintenance_end" value="{{settings.window_end}}" /></td>
      </tr>
      <tr>
        <th><label for="enable_time_check">Enable Time-Based Maintenance</label></th>
        <td><input type="checkbox" id="enable_time_check" name="enable_time_check" value="1"{{#if settings.time_check_enabled}} checked="checked"{{/if}} /></td>
      </tr>
      <tr>
        <th><label for="maintenance_message">Custom Maintenance Message</label></th>
        <td><textarea id="maintenance_message" name="maintenance_message" rows="3" cols="50">{{settings.message}}</textarea></td>
      </tr>
      <tr>
        <th><label for="maintenance_timezone">Timezone</label></th>
        <td><select id="maintenance_timezone" name="maintenance_timezone">
{{#each timezones}}          <option value="{{name}}"{{#if selected}} selected="selected"{{/if}}>{{name}}</option>
{{/each}}        </select></td>
      </tr>
    </table>
    <p class="submit"><input type="submit" class="button button-primary" value="Save Changes" /></p>
  </form>
  <hr>
  <h2>Emergency Login</h2>
  <p>Use the URL below for emergency access during maintenance:</p>
  <p><code>{{emergency_url}}</code></p>
</div>
</body>
</html>
"#;

const BLOCKED_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="robots" content="noindex,follow">
<title>Maintenance Mode</title>
</head>
<body>
{{{message}}}
</body>
</html>
"#;

/// One entry of the timezone dropdown
#[derive(Debug, Serialize)]
struct TimezoneOption {
    name: &'static str,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct SettingsPage<'a> {
    action: &'a str,
    settings: &'a MaintenanceSettings,
    timezones: Vec<TimezoneOption>,
    emergency_url: &'a str,
    updated: bool,
}

#[derive(Debug, Serialize)]
struct BlockedPage<'a> {
    message: &'a str,
}

/// Compiled page templates, shared by all handlers.
pub struct Templates {
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for Templates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Templates").finish_non_exhaustive()
    }
}

impl Templates {
    /// Compiles both templates.
    ///
    /// # Errors
    /// Returns `Error::TemplateSyntax` if a template does not compile.
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_template_string(SETTINGS_TEMPLATE_NAME, SETTINGS_TEMPLATE)?;
        registry.register_template_string(BLOCKED_TEMPLATE_NAME, BLOCKED_TEMPLATE)?;
        Ok(Self { registry })
    }

    /// Renders the admin settings form bound to `settings`.
    pub fn render_settings_page(
        &self,
        action: &str,
        settings: &MaintenanceSettings,
        emergency_url: &str,
        updated: bool,
    ) -> Result<String> {
        let timezones = chrono_tz::TZ_VARIANTS
            .iter()
            .map(|tz| TimezoneOption {
                name: tz.name(),
                selected: tz.name() == settings.timezone,
            })
            .collect();

        let page = SettingsPage {
            action,
            settings,
            timezones,
            emergency_url,
            updated,
        };
        Ok(self.registry.render(SETTINGS_TEMPLATE_NAME, &page)?)
    }

    /// Wraps the maintenance message in a minimal HTML document.
    pub fn render_blocked_page(&self, message: &str) -> Result<String> {
        Ok(self
            .registry
            .render(BLOCKED_TEMPLATE_NAME, &BlockedPage { message })?)
    }
}
