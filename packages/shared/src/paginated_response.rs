//! # ページ番号ベースのページネーション
//!
//! クエリの `page` / `per_page` を上限内に丸め、一覧レスポンスに
//! ページ情報を添える。

use serde::{Deserialize, Serialize};

const MAX_OFFSET: u64 = i64::MAX as u64;

/// 丸め済みのページ指定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
   page:     u64,
   per_page: u64,
}

impl PageRequest {
   /// `page` は 1 以上、`per_page` は `1..=max_per_page` に丸める
   ///
   /// 未指定の `per_page` は `default_per_page` を使う。
   pub fn new(
      page: Option<u64>,
      per_page: Option<u64>,
      default_per_page: u64,
      max_per_page: u64,
   ) -> Self {
      let max_per_page = max_per_page.max(1);
      Self {
         page:     page.unwrap_or(1).max(1),
         per_page: per_page.unwrap_or(default_per_page).clamp(1, max_per_page),
      }
   }

   pub fn page(&self) -> u64 {
      self.page
   }

   pub fn per_page(&self) -> u64 {
      self.per_page
   }

   /// 読み飛ばす件数（MongoDB の `skip` が受け付ける `i64::MAX` が上限）
   pub fn offset(&self) -> u64 {
      (self.page - 1)
         .saturating_mul(self.per_page)
         .min(MAX_OFFSET)
   }
}

/// ページ情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
   pub current_page: u64,
   pub per_page:     u64,
   pub total:        u64,
   pub total_pages:  u64,
   pub has_next:     bool,
   pub has_prev:     bool,
}

impl PageInfo {
   pub fn new(request: PageRequest, total: u64) -> Self {
      let total_pages = total.div_ceil(request.per_page);
      Self {
         current_page: request.page,
         per_page: request.per_page,
         total,
         total_pages,
         has_next: request.page < total_pages,
         has_prev: request.page > 1,
      }
   }
}

/// ページネーション付きレスポンス
///
/// ```json
/// { "data": [...], "pagination": { "current_page": 1, "per_page": 10, ... } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
   pub data:       Vec<T>,
   pub pagination: PageInfo,
}

impl<T> PaginatedResponse<T> {
   pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
      Self {
         data,
         pagination: PageInfo::new(request, total),
      }
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;
   use rstest::rstest;

   use super::*;

   #[rstest]
   #[case(None, None, 1, 10)]
   #[case(Some(0), Some(0), 1, 1)]
   #[case(Some(3), Some(500), 3, 50)]
   #[case(Some(2), Some(25), 2, 25)]
   fn test_page_requestは範囲内に丸める(
      #[case] page: Option<u64>,
      #[case] per_page: Option<u64>,
      #[case] expected_page: u64,
      #[case] expected_per_page: u64,
   ) {
      let request = PageRequest::new(page, per_page, 10, 50);

      assert_eq!(request.page(), expected_page);
      assert_eq!(request.per_page(), expected_per_page);
   }

   #[test]
   fn test_offsetは前のページまでの件数() {
      assert_eq!(PageRequest::new(Some(3), Some(10), 10, 50).offset(), 20);
      assert_eq!(PageRequest::new(Some(1), Some(10), 10, 50).offset(), 0);
   }

   #[test]
   fn test_巨大なページ番号でもoffsetはi64の範囲に収まる() {
      let request = PageRequest::new(Some(u64::MAX), Some(50), 10, 50);

      assert_eq!(request.offset(), i64::MAX as u64);
   }

   #[test]
   fn test_page_infoは総ページ数と前後の有無を計算する() {
      let info = PageInfo::new(PageRequest::new(Some(2), Some(10), 10, 50), 25);

      assert_eq!(
         info,
         PageInfo {
            current_page: 2,
            per_page:     10,
            total:        25,
            total_pages:  3,
            has_next:     true,
            has_prev:     true,
         }
      );
   }

   #[test]
   fn test_0件ならページはない() {
      let info = PageInfo::new(PageRequest::new(None, None, 10, 50), 0);

      assert_eq!(info.total_pages, 0);
      assert!(!info.has_next);
      assert!(!info.has_prev);
   }

   #[test]
   fn test_最終ページではhas_nextがfalse() {
      let info = PageInfo::new(PageRequest::new(Some(3), Some(10), 10, 50), 30);

      assert!(!info.has_next);
      assert!(info.has_prev);
   }
}
