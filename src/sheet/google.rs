//! Google Sheets v4 backend.
//!
//! Works on the first worksheet of one spreadsheet, opened either by id or by
//! exact file name through the Drive v3 search.

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;

use super::auth::{ServiceAccountKey, TokenProvider};
use super::{CellStyle, SheetStore, TextColor, a1};
use crate::config::Config;
use crate::error::{AppError, AppResult};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
const COLOR_FIELDS: &str =
    "sheets(data(rowData(values(effectiveFormat(textFormat(foregroundColor))))))";

// ---------------------------
// Response shapes
// ---------------------------

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct GridSpreadsheet {
    #[serde(default)]
    sheets: Vec<GridSheet>,
}

#[derive(Debug, Default, Deserialize)]
struct GridSheet {
    #[serde(default)]
    data: Vec<GridData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridData {
    #[serde(default)]
    row_data: Vec<RowData>,
}

#[derive(Debug, Default, Deserialize)]
struct RowData {
    #[serde(default)]
    values: Vec<CellData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CellData {
    effective_format: Option<CellFormat>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CellFormat {
    text_format: Option<TextFormat>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextFormat {
    foreground_color: Option<TextColor>,
}

impl GridSpreadsheet {
    fn into_colors(self) -> Vec<Vec<Option<TextColor>>> {
        let Some(grid) = self
            .sheets
            .into_iter()
            .next()
            .and_then(|sheet| sheet.data.into_iter().next())
        else {
            return Vec::new();
        };

        grid.row_data
            .into_iter()
            .map(|row| {
                row.values
                    .into_iter()
                    .map(|cell| {
                        cell.effective_format
                            .and_then(|f| f.text_format)
                            .and_then(|t| t.foreground_color)
                    })
                    .collect()
            })
            .collect()
    }
}

/// Body of the single `updateCells` request that writes value and text format.
fn update_cells_request(
    sheet_id: i64,
    row: u32,
    col: u32,
    text: &str,
    style: &CellStyle,
) -> serde_json::Value {
    let mut text_format = serde_json::Map::new();
    if let Some(font) = &style.font_family {
        text_format.insert("fontFamily".to_string(), json!(font));
    }
    if let Some(color) = &style.foreground {
        text_format.insert("foregroundColor".to_string(), json!(color));
    }

    json!({
        "requests": [{
            "updateCells": {
                "rows": [{
                    "values": [{
                        "userEnteredValue": { "stringValue": text },
                        "userEnteredFormat": { "textFormat": text_format }
                    }]
                }],
                "fields": "userEnteredValue,userEnteredFormat.textFormat",
                "range": {
                    "sheetId": sheet_id,
                    "startRowIndex": row - 1,
                    "endRowIndex": row,
                    "startColumnIndex": col - 1,
                    "endColumnIndex": col
                }
            }
        }]
    })
}

/// Quote a worksheet title for use in an A1 range.
fn quoted_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Client for the first worksheet of one Google spreadsheet.
#[derive(Debug)]
pub struct GoogleSheet {
    http: Client,
    auth: TokenProvider,
    spreadsheet_id: String,
    sheet_id: i64,
    title: String,
}

impl GoogleSheet {
    /// Authorize with the configured service account and open the spreadsheet.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let key = ServiceAccountKey::from_file(&config.credentials_file)?;
        let http = Client::new();
        let auth = TokenProvider::new(http.clone(), key);
        log::info!("authorizing as {}", auth.client_email());

        let spreadsheet_id = match &config.spreadsheet_id {
            Some(id) => id.clone(),
            None => Self::find_by_name(&http, &auth, &config.spreadsheet_name).await?,
        };

        let meta: SpreadsheetMeta = Self::send(
            http.get(format!("{}/{}", SHEETS_API, spreadsheet_id))
                .query(&[("fields", "sheets.properties(sheetId,title)")]),
            &auth,
        )
        .await?
        .json()
        .await?;

        let first = meta.sheets.into_iter().next().ok_or_else(|| {
            AppError::SpreadsheetNotFound(format!("{} has no worksheets", spreadsheet_id))
        })?;

        log::info!(
            "opened spreadsheet {} (worksheet '{}')",
            spreadsheet_id,
            first.properties.title
        );

        Ok(GoogleSheet {
            http,
            auth,
            spreadsheet_id,
            sheet_id: first.properties.sheet_id,
            title: first.properties.title,
        })
    }

    async fn find_by_name(http: &Client, auth: &TokenProvider, name: &str) -> AppResult<String> {
        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            name.replace('\\', "\\\\").replace('\'', "\\'"),
            SPREADSHEET_MIME
        );
        let list: DriveFileList = Self::send(
            http.get(DRIVE_FILES_API)
                .query(&[("q", query.as_str()), ("fields", "files(id)")]),
            auth,
        )
        .await?
        .json()
        .await?;

        list.files
            .into_iter()
            .next()
            .map(|f| f.id)
            .ok_or_else(|| AppError::SpreadsheetNotFound(name.to_string()))
    }

    /// Attach the bearer token, send, and turn non-2xx replies into errors.
    async fn send(request: RequestBuilder, auth: &TokenProvider) -> AppResult<Response> {
        let token = auth.token().await?;
        let response = request.bearer_auth(token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::Api {
            status: status.as_u16(),
            body,
        })
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/{}/values/{}",
            SHEETS_API,
            self.spreadsheet_id,
            urlencoding::encode(range)
        )
    }

    async fn get_values(&self, range: &str) -> AppResult<Vec<Vec<String>>> {
        let values: ValueRange = Self::send(
            self.http
                .get(self.values_url(range))
                .query(&[("majorDimension", "ROWS")]),
            &self.auth,
        )
        .await?
        .json()
        .await?;
        Ok(values.values)
    }
}

impl SheetStore for GoogleSheet {
    async fn row_values(&self, row: u32) -> AppResult<Vec<String>> {
        let range = format!("{}!{}:{}", quoted_title(&self.title), row, row);
        Ok(self.get_values(&range).await?.into_iter().next().unwrap_or_default())
    }

    async fn all_values(&self) -> AppResult<Vec<Vec<String>>> {
        self.get_values(&quoted_title(&self.title)).await
    }

    async fn update_cell(&self, row: u32, col: u32, text: &str) -> AppResult<()> {
        if row == 0 || col == 0 {
            return Err(AppError::InvalidAddress { row, col });
        }
        let range = format!("{}!{}", quoted_title(&self.title), a1(row, col));
        Self::send(
            self.http
                .put(self.values_url(&range))
                .query(&[("valueInputOption", "RAW")])
                .json(&json!({
                    "range": range,
                    "majorDimension": "ROWS",
                    "values": [[text]]
                })),
            &self.auth,
        )
        .await?;
        Ok(())
    }

    async fn write_cell(&self, row: u32, col: u32, text: &str, style: &CellStyle) -> AppResult<()> {
        if row == 0 || col == 0 {
            return Err(AppError::InvalidAddress { row, col });
        }
        let body = update_cells_request(self.sheet_id, row, col, text, style);
        Self::send(
            self.http
                .post(format!("{}/{}:batchUpdate", SHEETS_API, self.spreadsheet_id))
                .json(&body),
            &self.auth,
        )
        .await?;
        Ok(())
    }

    async fn text_colors(&self) -> AppResult<Vec<Vec<Option<TextColor>>>> {
        let title = quoted_title(&self.title);
        let grid: GridSpreadsheet = Self::send(
            self.http
                .get(format!("{}/{}", SHEETS_API, self.spreadsheet_id))
                .query(&[
                    ("includeGridData", "true"),
                    ("ranges", title.as_str()),
                    ("fields", COLOR_FIELDS),
                ]),
            &self.auth,
        )
        .await?
        .json()
        .await?;
        Ok(grid.into_colors())
    }

    async fn title(&self) -> AppResult<String> {
        let meta: SpreadsheetMeta = Self::send(
            self.http
                .get(format!("{}/{}", SHEETS_API, self.spreadsheet_id))
                .query(&[("fields", "sheets.properties(sheetId,title)")]),
            &self.auth,
        )
        .await?
        .json()
        .await?;
        meta.sheets
            .into_iter()
            .find(|s| s.properties.sheet_id == self.sheet_id)
            .map(|s| s.properties.title)
            .ok_or_else(|| AppError::SpreadsheetNotFound(self.spreadsheet_id.clone()))
    }
}
