//! PDF 合并服务 - 业务能力层
//!
//! 把一个学生的多个 PDF 按顺序拼成一个

use crate::error::{AppResult, FormatError};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 合并结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assembled {
    /// 没有输入，未生成文件
    Nothing,
    /// 已写入输出文件；单文件复制时页数可能读不出来
    Written { pages: Option<usize> },
}

/// 合并 PDF 并写入 `output`
pub fn assemble(pdfs: &[PathBuf], output: &Path) -> AppResult<Assembled> {
    match pdfs {
        [] => Ok(Assembled::Nothing),
        [single] => {
            // 只有一个文件时直接按字节复制，不要求 lopdf 能解析
            std::fs::copy(single, output).map_err(|e| FormatError::io(single, e))?;
            let pages = match page_count(output) {
                Ok(pages) => Some(pages),
                Err(e) => {
                    warn!("无法读取页数 {}: {}", output.display(), e);
                    None
                }
            };
            Ok(Assembled::Written { pages })
        }
        _ => {
            let mut document = merge(pdfs)?;
            let pages = document.get_pages().len();
            document
                .save(output)
                .map_err(|e| FormatError::Merge(format!("写入 {} 失败: {}", output.display(), e)))?;
            Ok(Assembled::Written { pages: Some(pages) })
        }
    }
}

/// 页面可以从页树节点继承的属性
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// 页树最大深度，防止循环引用
const MAX_TREE_DEPTH: usize = 64;

/// 读取 PDF 页数
pub fn page_count(path: &Path) -> AppResult<usize> {
    let doc = Document::load(path).map_err(|e| FormatError::pdf(path, e))?;
    Ok(doc.get_pages().len())
}

/// 按输入顺序合并所有页面
pub fn merge(pdfs: &[PathBuf]) -> AppResult<Document> {
    let mut max_id = 1;
    let mut pages: Vec<(ObjectId, Object)> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for path in pdfs {
        let mut doc = Document::load(path).map_err(|e| FormatError::pdf(path, e))?;
        // 对象编号整体后移，避免和已收集的对象冲突
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        debug!("读取 {} ({} 页)", path.display(), page_ids.len());
        for page_id in page_ids {
            let mut page = doc
                .get_dictionary(page_id)
                .map_err(|e| FormatError::pdf(path, e))?
                .clone();
            // 原页树会被丢弃，继承来的属性先写到页面上
            resolve_inherited(&doc, &mut page);
            pages.push((page_id, Object::Dictionary(page)));
        }
        objects.extend(doc.objects);
    }

    let mut document = Document::with_version("1.5");
    let mut catalog: Option<(ObjectId, Object)> = None;
    let mut pages_root: Option<(ObjectId, Object)> = None;

    for (id, object) in objects {
        let kind = object.type_name().map(str::to_string).unwrap_or_default();
        match kind.as_str() {
            "Catalog" => {
                // 保留第一个 Catalog 的编号
                let id = catalog.as_ref().map(|(first, _)| *first).unwrap_or(id);
                catalog = Some((id, object));
            }
            "Pages" => {
                // 所有页树节点合成一个，保留可继承的属性
                let Ok(dict) = object.as_dict() else {
                    continue;
                };
                let mut dict = dict.clone();
                if let Some((_, Object::Dictionary(previous))) = &pages_root {
                    for (key, value) in previous.iter() {
                        if !dict.has(key) {
                            dict.set(key.clone(), value.clone());
                        }
                    }
                }
                let id = pages_root.as_ref().map(|(first, _)| *first).unwrap_or(id);
                pages_root = Some((id, Object::Dictionary(dict)));
            }
            "Page" => {}
            "Outlines" | "Outline" => {}
            _ => {
                document.objects.insert(id, object);
            }
        }
    }

    let (pages_id, pages_object) =
        pages_root.ok_or_else(|| FormatError::Merge("找不到页树 (Pages)".to_string()))?;
    let (catalog_id, catalog_object) =
        catalog.ok_or_else(|| FormatError::Merge("找不到文档目录 (Catalog)".to_string()))?;

    for (id, page) in &pages {
        if let Ok(dict) = page.as_dict() {
            let mut dict = dict.clone();
            dict.set("Parent", Object::Reference(pages_id));
            document.objects.insert(*id, Object::Dictionary(dict));
        }
    }

    let mut pages_dict = pages_object
        .as_dict()
        .map_err(|e| FormatError::Merge(e.to_string()))?
        .clone();
    pages_dict.set("Count", pages.len() as i64);
    pages_dict.set(
        "Kids",
        pages
            .iter()
            .map(|(id, _)| Object::Reference(*id))
            .collect::<Vec<_>>(),
    );
    pages_dict.remove(b"Parent");
    document
        .objects
        .insert(pages_id, Object::Dictionary(pages_dict));

    let mut catalog_dict = catalog_object
        .as_dict()
        .map_err(|e| FormatError::Merge(e.to_string()))?
        .clone();
    catalog_dict.set("Pages", Object::Reference(pages_id));
    catalog_dict.remove(b"Outlines");
    document
        .objects
        .insert(catalog_id, Object::Dictionary(catalog_dict));

    document.trailer.set("Root", Object::Reference(catalog_id));
    document.max_id = document.objects.keys().map(|(id, _)| *id).max().unwrap_or(0);
    document.renumber_objects();
    document.compress();

    Ok(document)
}

fn resolve_inherited(doc: &Document, page: &mut Dictionary) {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    for _ in 0..MAX_TREE_DEPTH {
        let Some(id) = parent else {
            break;
        };
        let Ok(node) = doc.get_dictionary(id) else {
            break;
        };
        for key in INHERITABLE {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
}
