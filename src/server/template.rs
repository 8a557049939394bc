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

use maud::DOCTYPE;
use maud::Markup;
use maud::html;

pub fn page_template(body: Markup, refresh: bool) -> Markup {
    html! {
        (DOCTYPE)
        html lang="vi" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                @if refresh {
                    meta http-equiv="refresh" content="1";
                }
                title { "LearnCard" }
                link rel="stylesheet" href="/style.css";
            }
            body {
                header {
                    h1 { "LearnCard" }
                    p class="subtitle" { "Tạo thẻ ôn tập tự động - hăng say học tập" }
                }
                main {
                    (body)
                }
            }
        }
    }
}

pub fn error_banner(message: &str) -> Markup {
    html! {
        div class="error-banner" role="alert" {
            strong { "Lỗi!" }
            " "
            (message)
        }
    }
}
