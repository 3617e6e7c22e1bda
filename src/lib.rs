/*!
# Employee Work Log

A small web application where employees record what they worked on each day,
backed by a Google spreadsheet that stays the single system of record.

## Overview

Employees sign in with the email address listed in the sheet, see the last
five days of their log, and edit entries for dates that are not locked. The
application never caches sheet contents: every page reads the sheet live.

## Sheet Layout

- **Row 1**: reserved, never touched
- **Row 2**: header row - `Name`, `Email`, then one column per calendar day
  (`DD-MM-YYYY`, `DD.MM.YYYY` or `DD/MM/YYYY`)
- **Rows 3+**: one employee per row, one log entry per date column

## Locking

A log cell cannot be edited when:
- its date is a Sunday,
- its text is `Leave` (any case, surrounding whitespace ignored), or
- an owner has coloured its text red in the sheet.

Every work log view first appends missing date columns up to today, then
labels leave and Sunday cells, then evaluates locks for the rows it shows.

## Modules

- **header**: header row parsing and column lookup
- **lock**: lock policy (Sunday, leave, owner red text)
- **sheet**: spreadsheet store trait, in-memory and Google Sheets backends
- **worklog**: date column provisioning, auto-fill, cell formatting, views
- **login**: email login and the signed session cookie
- **pages**: HTML templates
- **app**: routing, shared state and server startup
- **config**: environment configuration
- **error**: application error type

## Endpoints

- `GET/POST /` - login form
- `GET /worklog` - recent entries of the signed-in employee
- `GET/POST /edit/{dmy}` - view or change one day's entry
- `GET /logout` - end the session
- `GET /healthz` - spreadsheet reachability
*/

pub mod config;
pub mod error;
pub mod header;
pub mod lock;
pub mod sheet;
pub mod worklog;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod login;
#[cfg(feature = "web")]
pub mod pages;

pub use error::{AppError, AppResult};
pub use header::{HeaderColumn, HeaderIndex};
pub use lock::{LockReason, LockStatus};
pub use sheet::{MemorySheet, SheetStore};
pub use worklog::{WorkLog, WorkLogEntry};
