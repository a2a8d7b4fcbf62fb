// Copyright 2025 SQLRoute Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Connection-string parsing error types.

use thiserror::Error;

/// Errors from connection-string inspection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DsnError {
    /// A keyword/value pair is malformed (missing `=` or empty keyword).
    #[error("invalid keyword/value pair in connection string")]
    InvalidKeywordValue,

    /// A quoted value is missing its closing quote.
    #[error("unterminated quoted string in connection string")]
    UnterminatedQuotedString,

    /// A value ends in the middle of a backslash escape.
    #[error("trailing backslash in connection string")]
    TrailingBackslash,
}
