//! In-memory storage engine for host-side tests and simulation.
//!
//! A fixed-capacity arena of nodes; node 0 is the root directory and every
//! other node remembers its parent. Non-root directories present synthetic
//! `.`/`..` entries at the head of their listing, as a FAT volume would.
//! Data is stored word-granular; byte semantics live entirely above the
//! `WordDrive` boundary.

use heapless::Vec;

use crate::{
    dir_entry::{DirEntry, ATTR_ARCHIVE, ATTR_DIRECTORY},
    drive::{DriveError, WordDrive},
    names::ShortName,
};

const ROOT: u16 = 0;

/// Start tokens mimic FAT cluster numbering: the root is 0, everything
/// else starts at 2.
fn start_token(node: u16) -> u32 {
    if node == ROOT {
        0
    } else {
        node as u32 + 2
    }
}

struct Node<const WORDS: usize> {
    name: [u8; 8],
    ext: [u8; 3],
    attributes: u8,
    parent: u16,
    alive: bool,
    size: u32,
    data: Vec<u16, WORDS>,
}

impl<const WORDS: usize> Node<WORDS> {
    fn directory(name: [u8; 8], parent: u16) -> Node<WORDS> {
        Node {
            name,
            ext: [b' '; 3],
            attributes: ATTR_DIRECTORY,
            parent,
            alive: true,
            size: 0,
            data: Vec::new(),
        }
    }

    fn file(name: [u8; 8], ext: [u8; 3], parent: u16) -> Node<WORDS> {
        Node {
            name,
            ext,
            attributes: ATTR_ARCHIVE,
            parent,
            alive: true,
            size: 0,
            data: Vec::new(),
        }
    }

    fn is_directory(&self) -> bool {
        self.attributes & ATTR_DIRECTORY > 0
    }
}

/// `NODES` bounds how many files and directories can exist at once;
/// `WORDS` bounds each file's data.
pub struct RamDisk<const NODES: usize, const WORDS: usize> {
    nodes: Vec<Node<WORDS>, NODES>,
}

enum Child {
    Dot(u16),
    Node(u16),
}

impl<const NODES: usize, const WORDS: usize> RamDisk<NODES, WORDS> {
    pub fn new() -> RamDisk<NODES, WORDS> {
        let mut nodes = Vec::new();
        let _ = nodes.push(Node::directory([b' '; 8], ROOT));
        RamDisk { nodes }
    }

    fn node(&self, id: u16) -> Result<&Node<WORDS>, DriveError> {
        match self.nodes.get(id as usize) {
            Some(n) if n.alive => Ok(n),
            _ => Err(DriveError::NotFound),
        }
    }

    fn node_mut(&mut self, id: u16) -> Result<&mut Node<WORDS>, DriveError> {
        match self.nodes.get_mut(id as usize) {
            Some(n) if n.alive => Ok(n),
            _ => Err(DriveError::NotFound),
        }
    }

    /// Children of `dir` in scan order: synthetic dots first (non-root),
    /// then live nodes in arena order.
    fn child_at(&self, dir: u16, scan_pos: u16) -> Option<Child> {
        let dots = if dir == ROOT { 0 } else { 2 };
        if scan_pos < dots {
            return Some(Child::Dot(scan_pos));
        }
        let mut skip = scan_pos - dots;
        for (id, node) in self.nodes.iter().enumerate().skip(1) {
            if node.alive && node.parent == dir {
                if skip == 0 {
                    return Some(Child::Node(id as u16));
                }
                skip -= 1;
            }
        }
        None
    }

    fn load(&self, entry: &mut DirEntry, dir: u16, scan_pos: u16) -> Result<(), DriveError> {
        match self.child_at(dir, scan_pos) {
            Some(Child::Dot(which)) => {
                let parent = self.node(dir)?.parent;
                let target = if which == 0 { dir } else { parent };
                entry.name = [b' '; 8];
                entry.name[0] = b'.';
                if which == 1 {
                    entry.name[1] = b'.';
                }
                entry.ext = [b' '; 3];
                entry.attributes = ATTR_DIRECTORY;
                entry.size = 0;
                entry.start_cluster = start_token(target);
                entry.node = target;
            }
            Some(Child::Node(id)) => {
                let node = self.node(id)?;
                entry.name = node.name;
                entry.ext = node.ext;
                entry.attributes = node.attributes;
                entry.size = node.size;
                entry.start_cluster = start_token(id);
                entry.node = id;
            }
            None => return Err(DriveError::NotFound),
        }
        entry.dir = dir;
        entry.scan_pos = scan_pos;
        entry.word_pos = 0;
        Ok(())
    }

    fn allocate(&mut self, node: Node<WORDS>) -> Result<u16, DriveError> {
        // Reuse a dead slot before growing the arena.
        if let Some(id) = self.nodes.iter().position(|n| !n.alive) {
            self.nodes[id] = node;
            return Ok(id as u16);
        }
        let id = self.nodes.len() as u16;
        self.nodes.push(node).map_err(|_| DriveError::Full)?;
        Ok(id)
    }

    fn install(&mut self, entry: &mut DirEntry, node: Node<WORDS>) -> Result<(), DriveError> {
        let dir = entry.dir;
        let id = self.allocate(node)?;
        let created = self.node(id)?;
        entry.name = created.name;
        entry.ext = created.ext;
        entry.attributes = created.attributes;
        entry.size = 0;
        entry.start_cluster = start_token(id);
        entry.dir = dir;
        entry.node = id;
        entry.scan_pos = 0;
        entry.word_pos = 0;
        Ok(())
    }
}

impl<const NODES: usize, const WORDS: usize> Default for RamDisk<NODES, WORDS> {
    fn default() -> Self {
        RamDisk::new()
    }
}

impl<const NODES: usize, const WORDS: usize> WordDrive for RamDisk<NODES, WORDS> {
    fn init(&mut self) -> Result<DirEntry, DriveError> {
        let mut entry = DirEntry::empty();
        entry.attributes = ATTR_DIRECTORY;
        entry.dir = ROOT;
        entry.node = ROOT;
        Ok(entry)
    }

    fn find_first(&mut self, entry: &mut DirEntry) -> Result<(), DriveError> {
        let dir = entry.dir;
        self.load(entry, dir, 0)
    }

    fn find_next(&mut self, entry: &mut DirEntry) -> Result<(), DriveError> {
        let dir = entry.dir;
        let next = entry.scan_pos + 1;
        self.load(entry, dir, next)
    }

    fn change_dir(&mut self, entry: &mut DirEntry) -> Result<(), DriveError> {
        let node = self.node(entry.node)?;
        if !node.is_directory() {
            return Err(DriveError::NotDirectory);
        }
        entry.dir = entry.node;
        Ok(())
    }

    fn create_file(&mut self, entry: &mut DirEntry, name: &ShortName) -> Result<(), DriveError> {
        let (padded, ext) = name.padded();
        let node = Node::file(padded, ext, entry.dir);
        self.install(entry, node)
    }

    fn create_dir(&mut self, entry: &mut DirEntry, name: &ShortName) -> Result<(), DriveError> {
        let (padded, _) = name.padded();
        let node = Node::directory(padded, entry.dir);
        self.install(entry, node)
    }

    fn remove(&mut self, entry: &mut DirEntry) -> Result<(), DriveError> {
        let id = entry.node;
        if id == ROOT {
            return Err(DriveError::InvalidName);
        }
        let node = self.node(id)?;
        if node.is_directory() {
            let populated = self
                .nodes
                .iter()
                .enumerate()
                .any(|(cid, n)| n.alive && n.parent == id && cid as u16 != id);
            if populated {
                return Err(DriveError::NotEmpty);
            }
        }
        self.node_mut(id)?.alive = false;
        Ok(())
    }

    fn rename(&mut self, entry: &mut DirEntry, name: &ShortName) -> Result<(), DriveError> {
        if entry.node == ROOT {
            return Err(DriveError::InvalidName);
        }
        let (padded, ext) = name.padded();
        let node = self.node_mut(entry.node)?;
        node.name = padded;
        if !node.is_directory() {
            node.ext = ext;
        }
        entry.name = padded;
        entry.ext = node.ext;
        Ok(())
    }

    fn seek_words(&mut self, entry: &mut DirEntry, word_pos: u32) -> Result<(), DriveError> {
        let len = self.node(entry.node)?.data.len() as u32;
        if word_pos > len {
            return Err(DriveError::Eof);
        }
        entry.word_pos = word_pos;
        Ok(())
    }

    fn read_words(&mut self, entry: &mut DirEntry, words: &mut [u16]) -> Result<(), DriveError> {
        let node = self.node(entry.node)?;
        let pos = entry.word_pos as usize;
        let end = pos + words.len();
        if end > node.data.len() {
            return Err(DriveError::Eof);
        }
        words.copy_from_slice(&node.data[pos..end]);
        entry.word_pos = end as u32;
        Ok(())
    }

    fn write_words(&mut self, entry: &mut DirEntry, words: &[u16]) -> Result<(), DriveError> {
        let node = self.node_mut(entry.node)?;
        let mut pos = entry.word_pos as usize;
        for &w in words {
            if pos < node.data.len() {
                node.data[pos] = w;
            } else {
                node.data.push(w).map_err(|_| DriveError::Full)?;
            }
            pos += 1;
        }
        entry.word_pos = pos as u32;
        node.size = node.size.max(pos as u32 * 2);
        entry.size = node.size;
        Ok(())
    }

    fn set_size(&mut self, entry: &mut DirEntry, bytes: u32) -> Result<(), DriveError> {
        let node = self.node_mut(entry.node)?;
        node.size = bytes;
        let words = ((bytes + 1) / 2) as usize;
        if words < node.data.len() {
            node.data.truncate(words);
        }
        entry.word_pos = entry.word_pos.min(node.data.len() as u32);
        entry.size = bytes;
        Ok(())
    }

    fn close(&mut self, _entry: &mut DirEntry) -> Result<(), DriveError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Disk = RamDisk<8, 64>;

    fn cursor(disk: &mut Disk) -> DirEntry {
        disk.init().unwrap()
    }

    #[test]
    fn root_starts_empty() {
        let mut disk = Disk::new();
        let mut entry = cursor(&mut disk);
        assert_eq!(disk.find_first(&mut entry), Err(DriveError::NotFound));
    }

    #[test]
    fn create_then_enumerate() {
        let mut disk = Disk::new();
        let mut entry = cursor(&mut disk);
        disk.create_file(&mut entry, &ShortName::parse("A.TXT").unwrap())
            .unwrap();
        let mut scan = cursor(&mut disk);
        disk.find_first(&mut scan).unwrap();
        assert_eq!(scan.base_name(), b"A");
        assert_eq!(scan.extension(), b"TXT");
        assert_eq!(disk.find_next(&mut scan), Err(DriveError::NotFound));
    }

    #[test]
    fn subdirectories_get_dot_entries() {
        let mut disk = Disk::new();
        let mut entry = cursor(&mut disk);
        disk.create_dir(&mut entry, &ShortName::parse("SUB").unwrap())
            .unwrap();
        disk.change_dir(&mut entry).unwrap();
        disk.find_first(&mut entry).unwrap();
        assert_eq!(entry.base_name(), b".");
        disk.find_next(&mut entry).unwrap();
        assert_eq!(entry.base_name(), b"..");
        assert_eq!(disk.find_next(&mut entry), Err(DriveError::NotFound));
    }

    #[test]
    fn dot_dot_leads_back_up() {
        let mut disk = Disk::new();
        let mut entry = cursor(&mut disk);
        disk.create_dir(&mut entry, &ShortName::parse("SUB").unwrap())
            .unwrap();
        disk.change_dir(&mut entry).unwrap();
        disk.find_first(&mut entry).unwrap(); // .
        disk.find_next(&mut entry).unwrap(); // ..
        disk.change_dir(&mut entry).unwrap();
        assert_eq!(entry.dir, ROOT);
    }

    #[test]
    fn word_io_round_trip() {
        let mut disk = Disk::new();
        let mut entry = cursor(&mut disk);
        disk.create_file(&mut entry, &ShortName::parse("W.BIN").unwrap())
            .unwrap();
        disk.write_words(&mut entry, &[1, 2, 3]).unwrap();
        assert_eq!(entry.size(), 6);
        disk.seek_words(&mut entry, 1).unwrap();
        let mut back = [0u16; 2];
        disk.read_words(&mut entry, &mut back).unwrap();
        assert_eq!(back, [2, 3]);
        let mut past = [0u16; 1];
        assert_eq!(
            disk.read_words(&mut entry, &mut past),
            Err(DriveError::Eof)
        );
    }

    #[test]
    fn set_size_truncates_words() {
        let mut disk = Disk::new();
        let mut entry = cursor(&mut disk);
        disk.create_file(&mut entry, &ShortName::parse("T.BIN").unwrap())
            .unwrap();
        disk.write_words(&mut entry, &[1, 2, 3]).unwrap();
        disk.set_size(&mut entry, 3).unwrap();
        assert_eq!(entry.size(), 3);
        disk.seek_words(&mut entry, 0).unwrap();
        let mut back = [0u16; 2];
        disk.read_words(&mut entry, &mut back).unwrap();
        assert_eq!(back, [1, 2]);
    }

    #[test]
    fn populated_directory_not_removable() {
        let mut disk = Disk::new();
        let mut dir = cursor(&mut disk);
        disk.create_dir(&mut dir, &ShortName::parse("SUB").unwrap())
            .unwrap();
        let mut inner = dir;
        disk.change_dir(&mut inner).unwrap();
        disk.create_file(&mut inner, &ShortName::parse("A.TXT").unwrap())
            .unwrap();
        assert_eq!(disk.remove(&mut dir), Err(DriveError::NotEmpty));
        disk.remove(&mut inner).unwrap();
        disk.remove(&mut dir).unwrap();
    }

    #[test]
    fn arena_capacity_bounded() {
        let mut disk = RamDisk::<3, 8>::new();
        let mut entry = disk.init().unwrap();
        disk.create_file(&mut entry, &ShortName::parse("A").unwrap())
            .unwrap();
        let mut entry2 = disk.init().unwrap();
        disk.create_file(&mut entry2, &ShortName::parse("B").unwrap())
            .unwrap();
        let mut entry3 = disk.init().unwrap();
        assert_eq!(
            disk.create_file(&mut entry3, &ShortName::parse("C").unwrap()),
            Err(DriveError::Full)
        );
    }
}
