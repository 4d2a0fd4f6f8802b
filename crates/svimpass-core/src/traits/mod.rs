// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! The credential store and CSV import/export live outside the vault core and
//! only reach the live key through these traits.

pub mod cipher;

pub use cipher::CredentialCipher;
