/// 组成 [`Name`] 的单个层级分量。
///
/// # 教案式说明
/// - **意图 (Why)**：命名数据转发以层级名称而非地址寻址，分量是最长前缀匹配的
///   最小单位；
/// - **契约 (What)**：分量不允许为空字符串——空分量会让 `/a//b` 与 `/a/b` 产生
///   歧义的前缀匹配结果。
pub type Component = String;

/// 层级名称，支持规范 URI 形式（`/a/b/c`）与最长前缀匹配。
///
/// 分量以 `String` 存储而非借用切片：`Name` 需要作为 `DashMap` 的键在线程间
/// 自由复制/克隆，借用形式在这里只会把生命周期参数传染给调用方的每个表。
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name {
    components: Vec<Component>,
}

impl Name {
    /// 构造空名称（根名称 `/`）。
    #[must_use]
    pub fn root() -> Self {
        Self { components: Vec::new() }
    }

    /// 解析形如 `/a/b/c` 的 URI。前导 `/` 可省略；重复的 `/` 或尾随 `/` 会被
    /// 拒绝，因为它们会产生空分量。
    pub fn parse(uri: &str) -> Result<Self, NameParseError> {
        let trimmed = uri.strip_prefix('/').unwrap_or(uri);
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        let mut components = Vec::new();
        for part in trimmed.split('/') {
            if part.is_empty() {
                return Err(NameParseError::EmptyComponent { uri: uri.to_owned() });
            }
            components.push(part.to_owned());
        }
        Ok(Self { components })
    }

    /// 以既有分量列表直接构造，跳过解析（用于测试与内部表生成）。
    #[must_use]
    pub fn from_components<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Component>,
    {
        Self {
            components: components.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// `self` 是否为 `other` 的前缀（含相等情形）。
    #[must_use]
    pub fn is_prefix_of(&self, other: &Name) -> bool {
        self.components.len() <= other.components.len()
            && self.components.iter().zip(other.components.iter()).all(|(a, b)| a == b)
    }

    /// 规范 URI 形式，根名称渲染为 `/`。
    #[must_use]
    pub fn to_uri(&self) -> String {
        if self.components.is_empty() {
            return "/".to_owned();
        }
        let mut out = String::with_capacity(self.components.iter().map(|c| c.len() + 1).sum());
        for c in &self.components {
            out.push('/');
            out.push_str(c);
        }
        out
    }
}

impl core::fmt::Display for Name {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.to_uri())
    }
}

/// 按最长前缀匹配在一组 `(Name, V)` 中查找最具体的条目。
///
/// FIB / StrategyTable / CS 的最长前缀查找都复用这个朴素线性扫描：表的规模
/// 以路由条目计，而非每秒报文数，线性扫描在该规模下足够快且易于审计；真正
/// 的生产实现可以换成 trie，但那是一处可替换的实现细节，不改变契约。
pub fn longest_prefix_match<'a, V>(entries: &'a [(Name, V)], name: &Name) -> Option<&'a V> {
    entries
        .iter()
        .filter(|(prefix, _)| prefix.is_prefix_of(name))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, v)| v)
}

/// 解析失败时的错误。
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum NameParseError {
    #[error("name `{uri}` contains an empty component")]
    EmptyComponent { uri: String },
}

/// 解析后的报文携带的类型标签，由首个标识符推导得出。
///
/// 决定转发器把入站报文分流到哪一条处理管线，还是按推送模式处理。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdentifierTag {
    ContentInterest,
    ContentData,
    Common,
    GppktDestination,
}
