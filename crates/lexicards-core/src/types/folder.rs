// Copyright 2025 Fernando Borretti
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

use serde::Deserialize;
use serde::Serialize;

use crate::types::ids::FolderId;
use crate::types::ids::UserId;

/// A named group of cards. Top-level folders contain subfolders, and cards
/// belong to subfolders.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub folder_id: FolderId,
    pub user_id: UserId,
    pub name: String,
    pub parent_id: Option<FolderId>,
}

impl Folder {
    pub fn is_subfolder(&self) -> bool {
        self.parent_id.is_some()
    }
}
