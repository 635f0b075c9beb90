use std::fs;
use std::path::PathBuf;

use serde_json::{Value, json};
use url::form_urlencoded;

use geda_core::client::{ApiClient, ContentApi, JsonMap};
use geda_core::document::parse_document_file;
use geda_core::import::{ImportOptions, PRIMARY_LOCALE, SECONDARY_LOCALE, import_post};
use geda_core::profile::{self, Profile};
use geda_core::resource::{Resource, upsert};

use crate::args::{
    AuthAction, Commands, HealthAction, ImportArgs, ListArgs, PostAction, ResourceAction,
    SettingsAction, UploadImageArgs, UpsertArgs,
};
use crate::failure::Failure;

const LOGIN_PATH: &str = "/api/v1/auth/login";
const LOGOUT_PATH: &str = "/api/v1/auth/logout";
const ME_PATH: &str = "/api/v1/auth/me";
const HEALTH_PATH: &str = "/api/v1/health";
const MEDIA_PATH: &str = "/api/v1/media";
const SETTINGS_PATH: &str = "/api/v1/settings";

pub fn run(command: Commands) -> Result<JsonMap, Failure> {
    match command {
        Commands::Auth(args) => match args.action {
            AuthAction::Login {
                base_url,
                email,
                password,
                device,
                otp,
                recovery_code,
            } => login(&base_url, &email, &password, &device, &otp, &recovery_code),
            AuthAction::Logout => logout(),
            AuthAction::Whoami => whoami(),
        },
        Commands::Health(args) => match args.action {
            HealthAction::Check { base_url } => health_check(base_url.as_deref()),
        },
        Commands::Post(args) => match args.action {
            PostAction::List(list) => list_resource(Resource::Post, &list),
            PostAction::Get { slug } => get_resource(Resource::Post, &slug),
            PostAction::Delete { slug } => delete_resource(Resource::Post, &slug),
            PostAction::Upsert(args) => upsert_resource(Resource::Post, &args),
            PostAction::Import(args) => import_bilingual_post(&args),
            PostAction::UploadImage(args) => upload_image(&args),
        },
        Commands::Category(args) => resource_command(Resource::Category, args.action),
        Commands::Tag(args) => resource_command(Resource::Tag, args.action),
        Commands::Page(args) => resource_command(Resource::Page, args.action),
        Commands::Product(args) => resource_command(Resource::Product, args.action),
        Commands::Settings(args) => settings_command(args.action),
    }
}

fn resource_command(resource: Resource, action: ResourceAction) -> Result<JsonMap, Failure> {
    match action {
        ResourceAction::List(args) => list_resource(resource, &args),
        ResourceAction::Get { slug } => get_resource(resource, &slug),
        ResourceAction::Delete { slug } => delete_resource(resource, &slug),
        ResourceAction::Upsert(args) => upsert_resource(resource, &args),
    }
}

fn login(
    base_url: &str,
    email: &str,
    password: &str,
    device: &str,
    otp: &str,
    recovery_code: &str,
) -> Result<JsonMap, Failure> {
    let base_url = base_url.trim().trim_end_matches('/');
    if base_url.is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(Failure::validation(
            "base-url, email, and password are required",
            "missing_required_flags",
        ));
    }
    let mut client = anonymous_client(base_url)?;
    let payload = json!({
        "email": email,
        "password": password,
        "device_name": device,
        "otp": blank_to_null(otp),
        "recovery_code": blank_to_null(recovery_code),
    });
    let response = client.post(LOGIN_PATH, &payload).map_err(Failure::from)?;

    let access_token = response
        .get("access_token")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if access_token.is_empty() {
        return Err(Failure::network(
            "login response did not include access_token",
            "invalid_login_response",
        )
        .with_details(Value::Object(response)));
    }
    let user_email = response
        .get("user")
        .and_then(Value::as_object)
        .and_then(|user| user.get("email"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let stored = Profile {
        base_url: base_url.to_string(),
        access_token,
        user_email,
        last_login_at: String::new(),
    };
    let path = profile_path()?;
    profile::save(&path, &stored).map_err(|error| {
        Failure::network("failed to save CLI profile", "save_profile_failed")
            .with_details(format!("{error:#}"))
    })?;
    Ok(response)
}

fn logout() -> Result<JsonMap, Failure> {
    let path = profile_path()?;
    let stored = profile::load(&path).map_err(|error| {
        Failure::network("failed to load CLI profile", "load_profile_failed")
            .with_details(format!("{error:#}"))
    })?;
    let Some(stored) = stored else {
        return Err(Failure::auth("you are not logged in", "not_logged_in"));
    };
    if stored.access_token.trim().is_empty() || stored.base_url.trim().is_empty() {
        return Err(Failure::auth("you are not logged in", "not_logged_in"));
    }
    let mut client = client_for(&stored.base_url, &stored.access_token)?;
    let response = client.post(LOGOUT_PATH, &json!({})).map_err(Failure::from)?;
    profile::clear(&path).map_err(|error| {
        Failure::network("failed to clear CLI profile", "clear_profile_failed")
            .with_details(format!("{error:#}"))
    })?;
    Ok(response)
}

fn whoami() -> Result<JsonMap, Failure> {
    let mut client = authenticated_client()?;
    client.get(ME_PATH).map_err(Failure::from)
}

fn health_check(base_url_flag: Option<&str>) -> Result<JsonMap, Failure> {
    let mut base_url = base_url_flag.unwrap_or_default().to_string();
    if base_url.trim().is_empty()
        && let Ok(path) = profile::default_path()
        && let Ok(Some(stored)) = profile::load(&path)
    {
        base_url = stored.base_url;
    }
    if base_url.trim().is_empty() {
        return Err(Failure::validation(
            "base-url is required when not logged in",
            "missing_base_url",
        ));
    }
    let mut client = anonymous_client(&base_url)?;
    client.get(HEALTH_PATH).map_err(Failure::from)
}

fn list_resource(resource: Resource, args: &ListArgs) -> Result<JsonMap, Failure> {
    let mut client = authenticated_client()?;
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("per_page", &args.per_page.to_string());
    if let Some(search) = non_empty(&args.search) {
        query.append_pair("search", search);
    }
    if let Some(status) = non_empty(&args.status) {
        query.append_pair("status", status);
    }
    if let Some(type_filter) = non_empty(&args.type_filter) {
        query.append_pair("type", type_filter);
    }
    let path = format!("{}?{}", resource.collection_path(), query.finish());
    client.get(&path).map_err(Failure::from)
}

fn get_resource(resource: Resource, slug: &str) -> Result<JsonMap, Failure> {
    let mut client = authenticated_client()?;
    let slug = require_non_blank(slug, "slug is required")?;
    client.get(&resource.item_path(slug)).map_err(Failure::from)
}

fn delete_resource(resource: Resource, slug: &str) -> Result<JsonMap, Failure> {
    let mut client = authenticated_client()?;
    let slug = require_non_blank(slug, "slug is required")?;
    client
        .delete(&resource.item_path(slug))
        .map_err(Failure::from)
}

fn upsert_resource(resource: Resource, args: &UpsertArgs) -> Result<JsonMap, Failure> {
    let mut client = authenticated_client()?;
    let data = fs::read_to_string(&args.file).map_err(|error| {
        Failure::validation("failed to read payload file", "invalid_payload_file")
            .with_details(error.to_string())
    })?;
    let payload: JsonMap = serde_json::from_str(&data).map_err(|error| {
        Failure::validation(
            "payload file must contain a JSON object",
            "invalid_payload_file",
        )
        .with_details(error.to_string())
    })?;

    let mut slug = args.slug.clone().unwrap_or_default();
    if slug.trim().is_empty() {
        slug = payload
            .get("slug")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
    }
    let slug = slug.trim();
    if slug.is_empty() {
        return Err(Failure::validation(
            "slug is required (provide --slug or a slug field in the payload)",
            "missing_slug",
        ));
    }
    upsert(&mut client, resource, slug, &Value::Object(payload)).map_err(Failure::from)
}

fn import_bilingual_post(args: &ImportArgs) -> Result<JsonMap, Failure> {
    let mut client = authenticated_client()?;
    let primary = parse_document_file(&args.vi).map_err(|error| {
        Failure::validation("failed to parse Vietnamese markdown", "invalid_markdown")
            .with_details(error.to_string())
    })?;
    let secondary = parse_document_file(&args.en).map_err(|error| {
        Failure::validation("failed to parse English markdown", "invalid_markdown")
            .with_details(error.to_string())
    })?;
    let options = ImportOptions {
        upsert: args.upsert,
    };
    import_post(&mut client, &primary, &secondary, &options).map_err(Failure::from)
}

fn upload_image(args: &UploadImageArgs) -> Result<JsonMap, Failure> {
    let mut client = authenticated_client()?;
    let fields = alt_text_fields(&args.alt_vi, &args.alt_en);
    client
        .post_multipart_file(MEDIA_PATH, "file", &args.file, &fields)
        .map_err(Failure::from)
}

fn settings_command(action: SettingsAction) -> Result<JsonMap, Failure> {
    let mut client = authenticated_client()?;
    match action {
        SettingsAction::List => client.get(SETTINGS_PATH).map_err(Failure::from),
        SettingsAction::Get { key } => {
            let key = require_non_blank(&key, "key is required")?;
            client
                .get(&format!("{SETTINGS_PATH}/{key}"))
                .map_err(Failure::from)
        }
        SettingsAction::Set { key, value } => {
            let key = require_non_blank(&key, "key is required")?;
            let payload = json!({ "value": parse_setting_value(&value) });
            client
                .put(&format!("{SETTINGS_PATH}/{key}"), &payload)
                .map_err(Failure::from)
        }
    }
}

/// Builds a client from the stored profile. Any problem that prevents an
/// authenticated call (unreadable profile, absent profile, blank token) is
/// reported as a login problem.
fn authenticated_client() -> Result<ApiClient, Failure> {
    let path = profile::default_path().map_err(|error| {
        Failure::auth(format!("failed to load CLI profile: {error:#}"), "not_logged_in")
    })?;
    let stored = profile::load(&path).map_err(|error| {
        Failure::auth(format!("failed to load CLI profile: {error:#}"), "not_logged_in")
    })?;
    let Some(stored) = stored else {
        return Err(not_logged_in());
    };
    if stored.access_token.trim().is_empty() || stored.base_url.trim().is_empty() {
        return Err(not_logged_in());
    }
    client_for(&stored.base_url, &stored.access_token)
}

fn anonymous_client(base_url: &str) -> Result<ApiClient, Failure> {
    client_for(base_url, "")
}

fn client_for(base_url: &str, access_token: &str) -> Result<ApiClient, Failure> {
    ApiClient::new(base_url, access_token).map_err(Failure::from)
}

fn profile_path() -> Result<PathBuf, Failure> {
    profile::default_path().map_err(|error| {
        Failure::network("failed to load CLI profile", "load_profile_failed")
            .with_details(format!("{error:#}"))
    })
}

fn not_logged_in() -> Failure {
    Failure::auth("missing CLI profile, run `geda auth login`", "not_logged_in")
}

fn blank_to_null(value: &str) -> Value {
    if value.trim().is_empty() {
        Value::Null
    } else {
        Value::from(value)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

fn require_non_blank<'a>(value: &'a str, message: &str) -> Result<&'a str, Failure> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Failure::validation(message, "missing_required_flags"));
    }
    Ok(trimmed)
}

/// Non-blank alt texts become locale-keyed form fields; the value is sent
/// untrimmed.
fn alt_text_fields(alt_vi: &str, alt_en: &str) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    if !alt_vi.trim().is_empty() {
        fields.push((format!("alt_text[{PRIMARY_LOCALE}]"), alt_vi.to_string()));
    }
    if !alt_en.trim().is_empty() {
        fields.push((format!("alt_text[{SECONDARY_LOCALE}]"), alt_en.to_string()));
    }
    fields
}

/// Setting values are JSON when they parse as JSON, raw strings otherwise, so
/// `--value '{"vi":"Tiêu đề"}'` and `--value hello` both do the obvious thing.
fn parse_setting_value(input: &str) -> Value {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Value::String(String::new());
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}
