/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `auth`      — session login/status/logout against the OS keyring
- `upload`    — bulk upload with live per-file progress
- `ask`       — streamed question answering with Ctrl-C cancellation
- `verify`    — fraud-verification submission and reports
- `predict`   — document-derived forecasts
- `documents` — listing and inspecting digitized documents

These handlers are intentionally small and use the library components:
the upload pipeline, the chat consumer, and the API wrappers.
*/

pub mod ask;
pub mod auth;
pub mod documents;
pub mod predict;
pub mod upload;
pub mod verify;
