/// 当前页面位置
///
/// 只关心路径部分，用来判断用户是否正在某条帖子的详情页
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageLocation {
    path: String,
}

impl PageLocation {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// 详情页主帖的 ID（`/<user>/status/<id>[/...]`）
    ///
    /// 首页信息流（`/`、`/home`）没有主帖
    pub fn detail_subject_id(&self) -> Option<&str> {
        if self.path == "/" || self.path == "/home" {
            return None;
        }
        let id = self.path.split("/status/").nth(1)?.split('/').next()?;
        if id.is_empty() {
            None
        } else {
            Some(id)
        }
    }

    pub fn is_detail_subject(&self, id: &str) -> bool {
        self.detail_subject_id() == Some(id)
    }
}
