// Copyright 2024 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

//! This module provides functions for producing the [COSE] signature that is
//! stored in a manifest's signature box.
//!
//! [COSE]: https://datatracker.ietf.org/doc/rfc9052/

mod error;
pub use error::CoseError;

mod sign;
pub use sign::{sign_claim, sign_claim_async, X5CHAIN};
