use std::collections::hash_map::{Entry, RandomState};
use std::collections::HashMap;
use std::hash::BuildHasher;

use parking_lot::Mutex;

use crate::types::{host::preferred_name, HostKey, Range};

use super::directive::{Directive, Tag};

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct HostRanges {
    pub name: String,
    pub includes: Vec<Range>,
    pub excludes: Vec<Range>,
}

impl HostRanges {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    fn push(&mut self, tag: Tag, range: Range) {
        match tag {
            Tag::Include => self.includes.push(range),
            Tag::Exclude => self.excludes.push(range),
        }
    }

    fn extend(&mut self, other: HostRanges) {
        preferred_name(&mut self.name, &other.name);
        self.includes.extend(other.includes);
        self.excludes.extend(other.excludes);
    }
}

/// Ranges collected from a single file. Owned by one worker, no locking.
#[repr(transparent)]
#[derive(Default, Debug)]
pub struct FileRanges {
    hosts: HashMap<HostKey, HostRanges>,
}

impl FileRanges {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add(&mut self, directive: Directive) {
        for name in &directive.hosts {
            self.host_entry(name).push(directive.tag, directive.range);
        }
    }

    pub fn add_include(&mut self, hosts: &[impl AsRef<str>], range: Range) {
        for name in hosts {
            self.host_entry(name.as_ref()).includes.push(range);
        }
    }

    pub fn add_exclude(&mut self, hosts: &[impl AsRef<str>], range: Range) {
        for name in hosts {
            self.host_entry(name.as_ref()).excludes.push(range);
        }
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    fn host_entry(&mut self, name: &str) -> &mut HostRanges {
        let entry = self
            .hosts
            .entry(HostKey::new(name))
            .or_insert_with(|| HostRanges::new(name));
        preferred_name(&mut entry.name, name);
        entry
    }
}

impl IntoIterator for FileRanges {
    type Item = (HostKey, HostRanges);
    type IntoIter = std::collections::hash_map::IntoIter<HostKey, HostRanges>;

    fn into_iter(self) -> Self::IntoIter {
        self.hosts.into_iter()
    }
}

type Shard = Mutex<HashMap<HostKey, HostRanges>>;

/// Include and exclude lists of all hosts, shared between file workers.
///
/// Hosts are spread over independently locked shards, so workers only
/// contend when they touch hosts from the same shard.
pub struct Accumulator {
    shards: Vec<Shard>,
    hasher: RandomState,
}

impl Accumulator {
    pub fn new(shards: usize) -> Self {
        Self {
            shards: (0..shards.max(1)).map(|_| Default::default()).collect(),
            hasher: RandomState::new(),
        }
    }

    pub fn add_include(&self, hosts: &[impl AsRef<str>], range: Range) {
        self.append(hosts, Tag::Include, range)
    }

    pub fn add_exclude(&self, hosts: &[impl AsRef<str>], range: Range) {
        self.append(hosts, Tag::Exclude, range)
    }

    /// Folds everything a worker collected from one file.
    pub fn absorb(&self, file: FileRanges) {
        if file.is_empty() {
            return;
        }
        let mut by_shard: Vec<Vec<(HostKey, HostRanges)>> =
            (0..self.shards.len()).map(|_| Vec::new()).collect();
        for (key, ranges) in file {
            by_shard[self.shard_index(&key)].push((key, ranges));
        }
        for (shard, hosts) in self.shards.iter().zip(by_shard) {
            if hosts.is_empty() {
                continue;
            }
            let mut shard = shard.lock();
            for (key, ranges) in hosts {
                match shard.entry(key) {
                    Entry::Occupied(mut entry) => entry.get_mut().extend(ranges),
                    Entry::Vacant(entry) => {
                        entry.insert(ranges);
                    }
                }
            }
        }
    }

    pub fn host_count(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    /// Consumes the accumulator. Only valid once every worker is done with it.
    pub fn into_hosts(self) -> impl Iterator<Item = (HostKey, HostRanges)> {
        self.shards
            .into_iter()
            .flat_map(|shard| shard.into_inner().into_iter())
    }

    fn append(&self, hosts: &[impl AsRef<str>], tag: Tag, range: Range) {
        for name in hosts {
            let name = name.as_ref();
            let key = HostKey::new(name);
            let mut shard = self.shards[self.shard_index(&key)].lock();
            let entry = shard.entry(key).or_insert_with(|| HostRanges::new(name));
            preferred_name(&mut entry.name, name);
            entry.push(tag, range);
        }
    }

    fn shard_index(&self, key: &HostKey) -> usize {
        (self.hasher.hash_one(key) % self.shards.len() as u64) as usize
    }
}
