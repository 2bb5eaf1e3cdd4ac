//!
//! A partition of a growing set of elements into blocks, which can be refined
//! by marking elements and splitting the blocks that contain marked elements.
//!
//! The invariants are that every element belongs to exactly one block, and
//! that no block is ever empty after a split.
//!

use std::fmt;

use log::trace;

pub type BlockIndex = usize;
pub type ElementIndex = usize;

struct Element<T> {
    data: T,
    block: BlockIndex,

    /// The position of the element within the members of its block.
    position: usize,
}

#[derive(Default)]
struct Block {
    /// The marked members are kept at the end.
    members: Vec<ElementIndex>,
    marked: usize,
}

impl Block {
    /// Returns the position of the first marked member.
    fn first_marked(&self) -> usize {
        self.members.len() - self.marked
    }
}

pub struct RefinablePartition<T> {
    elements: Vec<Element<T>>,
    blocks: Vec<Block>,

    /// The blocks that contain at least one marked element.
    touched: Vec<BlockIndex>,
}

impl<T> RefinablePartition<T> {
    /// Creates a partition without blocks.
    pub fn new() -> RefinablePartition<T> {
        RefinablePartition {
            elements: Vec::new(),
            blocks: Vec::new(),
            touched: Vec::new(),
        }
    }

    /// Adds a new empty block at the end.
    pub fn add_set(&mut self) -> BlockIndex {
        self.blocks.push(Block::default());
        self.blocks.len() - 1
    }

    /// Inserts a new unmarked element into the given block.
    pub fn insert_one(&mut self, block: BlockIndex, data: T) -> ElementIndex {
        let index = self.elements.len();
        let block_data = &mut self.blocks[block];

        let mut position = block_data.members.len();
        block_data.members.push(index);

        if block_data.marked > 0 {
            // Keep the marked members at the end.
            let first_marked = position - block_data.marked;
            block_data.members.swap(first_marked, position);
            self.elements[block_data.members[position]].position = position;
            position = first_marked;
        }

        self.elements.push(Element { data, block, position });
        index
    }

    /// Marks the given element, which is a no-op when it is already marked.
    pub fn mark(&mut self, element: ElementIndex) {
        let block = self.elements[element].block;
        let position = self.elements[element].position;

        let block_data = &mut self.blocks[block];
        let first_marked = block_data.first_marked();
        if position >= first_marked {
            return;
        }

        if block_data.marked == 0 {
            self.touched.push(block);
        }

        // Swap the element to the front of the marked members.
        let target = first_marked - 1;
        block_data.members.swap(position, target);
        self.elements[block_data.members[position]].position = position;
        self.elements[element].position = target;
        block_data.marked += 1;
    }

    /// Splits every block that has both marked and unmarked elements, where
    /// the smaller part is moved into a new block at the end. All marks are
    /// removed.
    ///
    /// Returns the index of the first new block, which is equal to the number
    /// of blocks when no block was split.
    pub fn split(&mut self) -> BlockIndex {
        let first_new = self.blocks.len();

        for block in std::mem::take(&mut self.touched) {
            let block_data = &mut self.blocks[block];
            let marked = block_data.marked;
            let first_marked = block_data.first_marked();
            block_data.marked = 0;

            if first_marked == 0 {
                // All elements are marked, so there is nothing to split.
                continue;
            }

            let new_block = self.blocks.len();
            let block_data = &mut self.blocks[block];
            let moved = if marked <= first_marked {
                block_data.members.split_off(first_marked)
            } else {
                // The unmarked part is smaller, so it moves and the marked part stays.
                let marked_members = block_data.members.split_off(first_marked);
                let unmarked_members = std::mem::replace(&mut block_data.members, marked_members);

                for (position, element) in block_data.members.iter().enumerate() {
                    self.elements[*element].position = position;
                }

                unmarked_members
            };

            for (position, element) in moved.iter().enumerate() {
                let element = &mut self.elements[*element];
                element.block = new_block;
                element.position = position;
            }

            trace!("Split block {block} into new block {new_block} of {} elements", moved.len());
            self.blocks.push(Block {
                members: moved,
                marked: 0,
            });
        }

        debug_assert!(
            self.is_consistent(),
            "After splitting the partition is inconsistent"
        );

        first_new
    }

    /// Returns the number of blocks in the partition.
    pub fn num_of_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn num_of_elements(&self) -> usize {
        self.elements.len()
    }

    /// Returns an iterator over all block indices.
    pub fn blocks(&self) -> impl Iterator<Item = BlockIndex> {
        0..self.blocks.len()
    }

    /// Returns an iterator over the elements of a given block.
    pub fn iter_block(&self, block: BlockIndex) -> impl Iterator<Item = ElementIndex> + '_ {
        self.blocks[block].members.iter().copied()
    }

    /// Returns the number of elements in the given block.
    pub fn block_len(&self, block: BlockIndex) -> usize {
        self.blocks[block].members.len()
    }

    /// Returns the block of the given element.
    pub fn block_of(&self, element: ElementIndex) -> BlockIndex {
        self.elements[element].block
    }

    /// Returns the data of the given element.
    pub fn element(&self, element: ElementIndex) -> &T {
        &self.elements[element].data
    }

    pub fn is_marked(&self, element: ElementIndex) -> bool {
        let element = &self.elements[element];
        element.position >= self.blocks[element.block].first_marked()
    }

    /// Returns true iff the invariants of the partition hold.
    fn is_consistent(&self) -> bool {
        let mut seen = vec![false; self.elements.len()];

        for (block_index, block) in self.blocks.iter().enumerate() {
            if block.marked > block.members.len() {
                return false;
            }

            for (position, element) in block.members.iter().enumerate() {
                if seen[*element] {
                    // This element belongs to another block.
                    return false;
                }
                seen[*element] = true;

                let entry = &self.elements[*element];
                if entry.block != block_index || entry.position != position {
                    return false;
                }
            }
        }

        // Check that every element belongs to a block.
        !seen.contains(&false)
    }
}

impl<T> Default for RefinablePartition<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for RefinablePartition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;

        let mut first_block = true;
        for block in &self.blocks {
            if !first_block {
                write!(f, ", ")?;
            }
            write!(f, "{{")?;

            let mut first = true;
            for element in &block.members {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{:?}", self.elements[*element].data)?;
                first = false;
            }

            write!(f, "}}")?;
            first_block = false;
        }

        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    /// Returns a partition with a single block containing 0..num_of_elements.
    fn single_block(num_of_elements: usize) -> RefinablePartition<usize> {
        let mut partition = RefinablePartition::new();
        let block = partition.add_set();
        for element in 0..num_of_elements {
            partition.insert_one(block, element);
        }

        partition
    }

    fn sorted_block(partition: &RefinablePartition<usize>, block: BlockIndex) -> Vec<usize> {
        let mut result: Vec<usize> = partition
            .iter_block(block)
            .map(|element| *partition.element(element))
            .collect();
        result.sort_unstable();
        result
    }

    #[test]
    fn test_partition_split() {
        let mut partition = single_block(10);

        for element in 0..3 {
            partition.mark(element);
        }
        partition.mark(1);
        assert!(partition.is_marked(1));
        assert!(!partition.is_marked(5));

        // The marked part is smaller, so it moves to the new block.
        assert_eq!(partition.split(), 1);
        assert_eq!(partition.num_of_blocks(), 2);
        assert_eq!(sorted_block(&partition, 1), vec![0, 1, 2]);
        assert_eq!(sorted_block(&partition, 0), vec![3, 4, 5, 6, 7, 8, 9]);
        assert!(!partition.is_marked(1));

        // Now the unmarked part is smaller.
        for element in 3..9 {
            partition.mark(element);
        }
        assert_eq!(partition.split(), 2);
        assert_eq!(sorted_block(&partition, 2), vec![9]);
        assert_eq!(sorted_block(&partition, 0), vec![3, 4, 5, 6, 7, 8]);
        assert_eq!(partition.block_of(9), 2);
        assert_eq!(partition.block_of(4), 0);
    }

    #[test]
    fn test_partition_no_split() {
        let mut partition = single_block(4);

        // Marking every element of a block only clears the marks.
        for element in 0..4 {
            partition.mark(element);
        }
        assert_eq!(partition.split(), 1);
        assert_eq!(partition.num_of_blocks(), 1);
        assert!((0..4).all(|element| !partition.is_marked(element)));

        // Nothing marked at all.
        assert_eq!(partition.split(), 1);
    }

    #[test]
    fn test_partition_tie() {
        let mut partition = single_block(4);
        partition.mark(0);
        partition.mark(3);

        // On a tie the marked part moves.
        partition.split();
        assert_eq!(sorted_block(&partition, 1), vec![0, 3]);
        assert_eq!(partition.block_len(0), 2);
    }

    #[test]
    fn test_partition_insert_while_marked() {
        let mut partition = single_block(3);
        partition.mark(0);

        // The new element is inserted unmarked.
        let element = partition.insert_one(0, 3);
        assert!(!partition.is_marked(element));
        assert!(partition.is_marked(0));

        partition.split();
        assert_eq!(sorted_block(&partition, 1), vec![0]);
        assert_eq!(sorted_block(&partition, 0), vec![1, 2, 3]);
        assert_eq!(partition.num_of_elements(), 4);
    }

    #[test]
    fn test_partition_multiple_blocks() {
        let mut partition: RefinablePartition<usize> = RefinablePartition::new();
        let first = partition.add_set();
        let second = partition.add_set();
        for element in 0..6 {
            partition.insert_one(if element < 3 { first } else { second }, element);
        }

        partition.mark(0);
        partition.mark(4);
        assert_eq!(partition.split(), 2);
        assert_eq!(partition.num_of_blocks(), 4);
        assert_eq!(sorted_block(&partition, 2), vec![0]);
        assert_eq!(sorted_block(&partition, 3), vec![4]);
        assert_eq!(partition.blocks().count(), 4);
    }

    #[test]
    fn test_partition_debug() {
        let mut partition = single_block(3);
        partition.mark(2);
        partition.split();

        assert_eq!(format!("{partition:?}"), "{{0, 1}, {2}}");
    }
}
