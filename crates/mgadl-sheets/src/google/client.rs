use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use mgadl_core::models::cell::CellValue;

use crate::backend::{
    AppendResponse, NEW_TAB_COLS, NEW_TAB_ROWS, Spreadsheet, SpreadsheetMeta, TabRef,
};
use crate::error::SheetsError;
use crate::google::auth::{ServiceAccountKey, TokenSource};

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const USER_ENTERED: &str = "USER_ENTERED";

/// Everything but RFC 3986 unreserved characters.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Deserialize)]
struct SpreadsheetResource {
    properties: SheetTitle,
    #[serde(default)]
    sheets: Vec<SheetResource>,
}

#[derive(Debug, Deserialize)]
struct SheetResource {
    properties: SheetTitle,
}

#[derive(Debug, Deserialize)]
struct SheetTitle {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct AppendValuesResponse {
    #[serde(default)]
    updates: Option<UpdateValuesResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateValuesResponse {
    #[serde(default)]
    updated_range: Option<String>,
}

/// Google Sheets client. Blocking; each trait call is one or two HTTP
/// round trips.
pub struct GoogleSheets {
    agent: ureq::Agent,
    base_url: String,
    tokens: Option<TokenSource>,
}

impl GoogleSheets {
    /// Build a client. Without a key every call fails with
    /// [`SheetsError::Config`], so construction itself never fails.
    pub fn new(key: Option<ServiceAccountKey>) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            base_url: SHEETS_API_BASE.to_string(),
            tokens: key.map(TokenSource::new),
        }
    }

    fn bearer(&self) -> Result<String, SheetsError> {
        let tokens = self.tokens.as_ref().ok_or_else(|| {
            SheetsError::Config("GOOGLE_SERVICE_ACCOUNT is not configured".to_string())
        })?;
        Ok(format!("Bearer {}", tokens.access_token(&self.agent)?))
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> String {
        format!(
            "{}/{}/values/{}",
            self.base_url,
            encode_path_segment(spreadsheet_id),
            encode_path_segment(range)
        )
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SheetsError> {
        let mut req = self.agent.get(url).header("Authorization", &self.bearer()?);
        for (k, v) in query {
            req = req.query(*k, *v);
        }
        tracing::debug!(%url, "GET");
        let response = req.call().map_err(transport)?;
        let (status, text) = read_body(response)?;
        parse_response(status, &text)
    }

    fn post(
        &self,
        url: &str,
        query: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<(u16, String), SheetsError> {
        let mut req = self.agent.post(url).header("Authorization", &self.bearer()?);
        for (k, v) in query {
            req = req.query(*k, *v);
        }
        tracing::debug!(%url, "POST");
        read_body(req.send_json(body).map_err(transport)?)
    }

    fn put(
        &self,
        url: &str,
        query: &[(&str, &str)],
        body: &serde_json::Value,
    ) -> Result<(u16, String), SheetsError> {
        let mut req = self.agent.put(url).header("Authorization", &self.bearer()?);
        for (k, v) in query {
            req = req.query(*k, *v);
        }
        tracing::debug!(%url, "PUT");
        read_body(req.send_json(body).map_err(transport)?)
    }
}

impl Spreadsheet for GoogleSheets {
    fn open_by_id(&self, spreadsheet_id: &str) -> Result<SpreadsheetMeta, SheetsError> {
        let url = format!("{}/{}", self.base_url, encode_path_segment(spreadsheet_id));
        let resource: SpreadsheetResource = self
            .get_json(&url, &[("fields", "properties.title,sheets.properties.title")])
            .map_err(|e| open_error(spreadsheet_id, e))?;

        Ok(SpreadsheetMeta {
            spreadsheet_id: spreadsheet_id.to_string(),
            title: resource.properties.title,
            tab_titles: resource
                .sheets
                .into_iter()
                .map(|s| s.properties.title)
                .collect(),
        })
    }

    fn get_or_create_tab(
        &self,
        spreadsheet: &SpreadsheetMeta,
        name: &str,
    ) -> Result<TabRef, SheetsError> {
        let tab = TabRef {
            spreadsheet_id: spreadsheet.spreadsheet_id.clone(),
            spreadsheet_title: spreadsheet.title.clone(),
            title: name.to_string(),
        };
        if spreadsheet.tab_titles.iter().any(|t| t == name) {
            return Ok(tab);
        }

        let url = format!(
            "{}/{}:batchUpdate",
            self.base_url,
            encode_path_segment(&spreadsheet.spreadsheet_id)
        );
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": name,
                        "gridProperties": {
                            "rowCount": NEW_TAB_ROWS,
                            "columnCount": NEW_TAB_COLS,
                        }
                    }
                }
            }]
        });
        let (status, text) = self.post(&url, &[], &body)?;
        let _: serde_json::Value = parse_response(status, &text)?;
        tracing::info!(tab = %name, "worksheet created");
        Ok(tab)
    }

    fn read_header_row(&self, tab: &TabRef) -> Result<Vec<String>, SheetsError> {
        let url = self.values_url(&tab.spreadsheet_id, &header_range(&tab.title));
        let range: ValueRange = self.get_json(&url, &[("majorDimension", "ROWS")])?;

        Ok(range
            .values
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect())
    }

    fn write_header_row(&self, tab: &TabRef, columns: &[String]) -> Result<(), SheetsError> {
        let range = header_range(&tab.title);
        let url = self.values_url(&tab.spreadsheet_id, &range);
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": [columns],
        });
        let (status, text) = self.put(&url, &[("valueInputOption", USER_ENTERED)], &body)?;
        let _: serde_json::Value = parse_response(status, &text)?;
        Ok(())
    }

    fn append_row(
        &self,
        tab: &TabRef,
        values: &[CellValue],
    ) -> Result<AppendResponse, SheetsError> {
        let url = format!(
            "{}:append",
            self.values_url(&tab.spreadsheet_id, &format!("{}!A1", quote_tab(&tab.title)))
        );
        let body = json!({
            "majorDimension": "ROWS",
            "values": [values],
        });
        let (status, text) = self.post(
            &url,
            &[
                ("valueInputOption", USER_ENTERED),
                ("insertDataOption", "INSERT_ROWS"),
            ],
            &body,
        )?;
        parse_append_response(status, &text)
    }
}

fn transport(e: ureq::Error) -> SheetsError {
    SheetsError::Transport(e.to_string())
}

fn read_body(
    mut response: ureq::http::Response<ureq::Body>,
) -> Result<(u16, String), SheetsError> {
    let status = response.status().as_u16();
    let text = response.body_mut().read_to_string().map_err(transport)?;
    Ok((status, text))
}

/// Decode a Sheets API reply. Status 400 and up becomes
/// [`SheetsError::Remote`]; an empty success body decodes as `{}`.
pub fn parse_response<T: DeserializeOwned>(status: u16, text: &str) -> Result<T, SheetsError> {
    if status >= 400 {
        return Err(SheetsError::Remote {
            status,
            message: api_error_message(text),
        });
    }
    if text.trim().is_empty() {
        return Ok(serde_json::from_str("{}")?);
    }
    Ok(serde_json::from_str(text)?)
}

/// Decode a `values:append` reply.
pub fn parse_append_response(status: u16, text: &str) -> Result<AppendResponse, SheetsError> {
    let response: AppendValuesResponse = parse_response(status, text)?;
    Ok(AppendResponse {
        updated_range: response.updates.and_then(|u| u.updated_range),
    })
}

/// The API answers 403 for spreadsheets the service account can't see and
/// 404 for unknown ids; both mean "not found" to the caller.
pub fn open_error(spreadsheet_id: &str, err: SheetsError) -> SheetsError {
    match err {
        SheetsError::Remote { status: 403 | 404, .. } => SheetsError::NotFound {
            spreadsheet_id: spreadsheet_id.to_string(),
        },
        other => other,
    }
}

/// Pull `error.message` out of a Google API error body, falling back to the
/// raw text.
pub fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

/// `'Tab Name'` with embedded quotes doubled, as A1 notation requires.
pub fn quote_tab(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Row 1 of a tab in A1 notation.
pub fn header_range(title: &str) -> String {
    format!("{}!1:1", quote_tab(title))
}

/// Percent-encode everything but RFC 3986 unreserved characters.
pub fn encode_path_segment(raw: &str) -> String {
    utf8_percent_encode(raw, SEGMENT).to_string()
}
