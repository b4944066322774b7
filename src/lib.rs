//! Stream UBX messages from a u-blox GNSS receiver
//!
//! Use [`run`] to stream from a [`Connector`] (e.g. [`SerialConnector`]) to
//! any writer, and [`UbxStream`] to read [`MessagePair`]s from any byte source.
//! Decoding of the messages is done by the `ublox` crate.
// Copyright (C) 2026 The ubxdump developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

mod connection;
mod error;
mod message;
pub mod render;
mod runner;
pub mod settings;
mod stream;

pub use crate::{
    connection::{Connector, SerialConnector},
    error::Error,
    message::{MessagePair, Parsed},
    runner::{Termination, run},
    settings::{Setting, Settings, is_help_token},
    stream::UbxStream,
};
